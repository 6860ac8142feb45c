use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::platform::ScrollContainer;
use crate::visibility::{IntersectionEntry, ObservedTarget};

/// Keeps the scroll position and the active item of one open cycle in step.
///
/// The active index lives behind an `Rc` owned here; enter handlers only hold
/// a weak reference, so once the cycle is dropped they can no longer write.
#[derive(Debug)]
pub struct CarouselSync {
    initial_index: usize,
    item_count: usize,
    active: Rc<Cell<usize>>,
    seeked_to: Option<f64>,
}

impl CarouselSync {
    pub fn new(initial_index: usize, item_count: usize) -> Self {
        Self {
            initial_index,
            item_count,
            active: Rc::new(Cell::new(initial_index)),
            seeked_to: None,
        }
    }

    pub fn active_index(&self) -> usize {
        self.active.get()
    }

    /// Seek to the initial item once the container has a width. Runs at most
    /// once per cycle; later calls never fight the user's scrolling.
    pub fn seek_if_ready(&mut self, container: &mut dyn ScrollContainer) -> Option<f64> {
        if self.seeked_to.is_some() {
            return None;
        }
        let width = container
            .size()
            .map(|size| size.width)
            .filter(|width| width.is_finite() && *width > 0.0)?;
        let offset = self.initial_index as f64 * width;
        container.set_scroll_offset_x(offset);
        self.seeked_to = Some(offset);
        tracing::debug!(index = self.initial_index, width, offset, "seeked carousel to initial item");
        Some(offset)
    }

    /// Callback for the intersection tracker: last qualifying enter wins.
    pub fn enter_handler(&self) -> impl FnMut(&ObservedTarget, &IntersectionEntry) + 'static {
        let active: Weak<Cell<usize>> = Rc::downgrade(&self.active);
        let item_count = self.item_count;
        move |target: &ObservedTarget, entry: &IntersectionEntry| {
            let Some(active) = active.upgrade() else {
                tracing::debug!(index = target.index, "enter after close discarded");
                return;
            };
            if target.index >= item_count {
                tracing::warn!(index = target.index, item_count, "enter for unknown item ignored");
                return;
            }
            let previous = active.replace(target.index);
            if previous != target.index {
                tracing::debug!(
                    from = previous,
                    to = target.index,
                    ratio = entry.intersection_ratio,
                    "active carousel item changed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Size};
    use crate::platform::HeadlessContainer;

    fn full_entry() -> IntersectionEntry {
        let root = Rect::new(0.0, 0.0, 400.0, 800.0);
        IntersectionEntry::from_rects(root, root)
    }

    #[test]
    fn seek_waits_for_measurement_then_runs_once() {
        let mut container = HeadlessContainer::unmeasured();
        let mut sync = CarouselSync::new(2, 4);

        assert_eq!(sync.seek_if_ready(&mut container), None);
        container.resize(Some(Size::new(0.0, 800.0)));
        assert_eq!(sync.seek_if_ready(&mut container), None);

        container.resize(Some(Size::new(400.0, 800.0)));
        assert_eq!(sync.seek_if_ready(&mut container), Some(800.0));
        assert_eq!(container.scroll_offset_x(), 800.0);

        container.user_scroll_to(1_200.0);
        container.resize(Some(Size::new(500.0, 800.0)));
        assert_eq!(sync.seek_if_ready(&mut container), None);
        assert_eq!(container.scroll_offset_x(), 1_200.0);
        assert_eq!(container.seeks(), vec![800.0]);
    }

    #[test]
    fn active_index_defaults_to_initial_and_follows_last_enter() {
        let sync = CarouselSync::new(1, 3);
        assert_eq!(sync.active_index(), 1);

        let mut handler = sync.enter_handler();
        handler(&ObservedTarget::new(2, "c"), &full_entry());
        handler(&ObservedTarget::new(0, "a"), &full_entry());
        assert_eq!(sync.active_index(), 0);
    }

    #[test]
    fn out_of_range_enter_is_ignored() {
        let sync = CarouselSync::new(0, 2);
        let mut handler = sync.enter_handler();
        handler(&ObservedTarget::new(5, "ghost"), &full_entry());
        assert_eq!(sync.active_index(), 0);
    }

    #[test]
    fn handler_outliving_its_cycle_cannot_write() {
        let sync = CarouselSync::new(0, 3);
        let mut handler = sync.enter_handler();
        drop(sync);
        handler(&ObservedTarget::new(2, "c"), &full_entry());
    }
}

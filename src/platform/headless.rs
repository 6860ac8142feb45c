use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::geometry::{Rect, Size};
use crate::visibility::{EntrySink, IntersectionEntry};

use super::{ObservationBackend, ObservationError, ObservationId, ObserveRequest, ScrollContainer};

#[derive(Debug, Default)]
struct ContainerState {
    size: Option<Size>,
    scroll_offset_x: f64,
    seeks: Vec<f64>,
}

/// In-memory scroll container for replays and tests. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct HeadlessContainer {
    state: Rc<RefCell<ContainerState>>,
}

impl HeadlessContainer {
    pub fn unmeasured() -> Self {
        Self::default()
    }

    pub fn with_size(width: f64, height: f64) -> Self {
        let container = Self::default();
        container.resize(Some(Size::new(width, height)));
        container
    }

    pub fn resize(&self, size: Option<Size>) {
        self.state.borrow_mut().size = size;
    }

    /// Offset change driven by the user rather than by the engine.
    pub fn user_scroll_to(&self, offset: f64) {
        self.state.borrow_mut().scroll_offset_x = offset;
    }

    pub fn scroll_offset_x(&self) -> f64 {
        self.state.borrow().scroll_offset_x
    }

    /// Offsets written by the engine, oldest first.
    pub fn seeks(&self) -> Vec<f64> {
        self.state.borrow().seeks.clone()
    }
}

impl ScrollContainer for HeadlessContainer {
    fn size(&self) -> Option<Size> {
        self.state.borrow().size
    }

    fn set_scroll_offset_x(&mut self, offset: f64) {
        let mut state = self.state.borrow_mut();
        state.scroll_offset_x = offset;
        state.seeks.push(offset);
    }
}

#[derive(Debug)]
struct Observation {
    request: ObserveRequest,
    sink: EntrySink,
    last_qualified: Option<bool>,
}

#[derive(Debug)]
struct ObserverState {
    supported: bool,
    next_id: u64,
    observations: BTreeMap<ObservationId, Observation>,
    observe_calls: usize,
    disconnect_calls: usize,
    pending_rejection: Option<String>,
}

/// Geometry-driven observation backend for a carousel of equal-width pages.
///
/// Mirrors platform observers by reporting an entry only when an item's
/// qualification changes, plus once for the first emission after observe.
#[derive(Debug, Clone)]
pub struct HeadlessObserver {
    state: Rc<RefCell<ObserverState>>,
}

impl Default for HeadlessObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessObserver {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ObserverState {
                supported: true,
                next_id: 1,
                observations: BTreeMap::new(),
                observe_calls: 0,
                disconnect_calls: 0,
                pending_rejection: None,
            })),
        }
    }

    /// A backend standing in for a platform without intersection observation.
    pub fn unsupported() -> Self {
        let observer = Self::new();
        observer.state.borrow_mut().supported = false;
        observer
    }

    pub fn reject_next(&self, reason: impl Into<String>) {
        self.state.borrow_mut().pending_rejection = Some(reason.into());
    }

    /// Most recent live registration for the item at `index`.
    pub fn sink_for(&self, index: usize) -> Option<EntrySink> {
        self.state
            .borrow()
            .observations
            .values()
            .rev()
            .find(|observation| observation.request.target.index == index)
            .map(|observation| observation.sink.clone())
    }

    pub fn active_observations(&self) -> usize {
        self.state.borrow().observations.len()
    }

    pub fn observe_calls(&self) -> usize {
        self.state.borrow().observe_calls
    }

    pub fn disconnect_calls(&self) -> usize {
        self.state.borrow().disconnect_calls
    }

    /// Report qualification changes for pages laid out at `index * viewport.width`
    /// and scrolled by `scroll_x`. Returns how many enter notifications fired.
    ///
    /// A page qualifies once its ratio meets the threshold and it is fully
    /// contained, so below 100% a page that crossed the ratio while clipped is
    /// reported again when it settles inside the viewport.
    pub fn emit_for_scroll(&self, viewport: Size, scroll_x: f64) -> usize {
        let root = Rect::new(0.0, 0.0, viewport.width, viewport.height);
        let deliveries: Vec<(EntrySink, IntersectionEntry)> = {
            let mut state = self.state.borrow_mut();
            state
                .observations
                .values_mut()
                .filter_map(|observation| {
                    let left = observation.request.target.index as f64 * viewport.width - scroll_x;
                    let target = Rect::new(left, 0.0, viewport.width, viewport.height);
                    let entry = IntersectionEntry::from_rects(target, root);
                    let qualified = entry.qualifies(observation.request.threshold);
                    if observation.last_qualified == Some(qualified) {
                        return None;
                    }
                    observation.last_qualified = Some(qualified);
                    Some((observation.sink.clone(), entry))
                })
                .collect()
        };

        deliveries
            .into_iter()
            .filter(|(sink, entry)| sink.deliver(entry))
            .count()
    }
}

impl ObservationBackend for HeadlessObserver {
    fn is_supported(&self) -> bool {
        self.state.borrow().supported
    }

    fn observe(
        &mut self,
        request: ObserveRequest,
        sink: EntrySink,
    ) -> Result<ObservationId, ObservationError> {
        let mut state = self.state.borrow_mut();
        state.observe_calls += 1;
        if let Some(reason) = state.pending_rejection.take() {
            return Err(ObservationError::Rejected {
                index: request.target.index,
                identity: request.target.identity.clone(),
                reason,
            });
        }
        let id = ObservationId(state.next_id);
        state.next_id += 1;
        state.observations.insert(
            id,
            Observation {
                request,
                sink,
                last_qualified: None,
            },
        );
        Ok(id)
    }

    fn disconnect(&mut self, id: ObservationId) {
        let mut state = self.state.borrow_mut();
        state.disconnect_calls += 1;
        state.observations.remove(&id);
    }
}

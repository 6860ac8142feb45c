use std::time::Instant;

use crate::animation::Tween;
use crate::carousel::{Carousel, CarouselMode, CarouselSync, ItemCollection};
use crate::config::LightboxConfig;
use crate::error::{LightboxError, LightboxResult};
use crate::gesture::{DismissThresholds, DragController, DragSample, DragVerdict};
use crate::platform::{Capability, ObservationBackend, ScrollContainer};
use crate::scheduler::{CycleId, TaskKind, TaskQueue};
use crate::state::{OverlayEvent, OverlayState, StateMachine, StateTransition};
use crate::theme::resolve_backdrop_color;
use crate::visibility::{IntersectionTracker, ObservedTarget};

use super::payload::ViewerPayload;
use super::projection::{DragAxis, Projection};
use super::transition::{GroupId, TokenHolder, TransitionToken};
use super::PreconditionViolation;

/// Everything that lives for exactly one open cycle. Dropping it tears the
/// payload, active index, drag state, animations and observations down together.
struct OpenCycle {
    id: CycleId,
    payload: ViewerPayload,
    carousel: Carousel,
    sync: CarouselSync,
    drag: DragController,
    tracker: IntersectionTracker,
    entrance: Tween,
    entrance_opacity: f64,
}

impl OpenCycle {
    fn active_index(&self) -> usize {
        self.sync.active_index()
    }

    fn active_identity(&self) -> Option<&str> {
        self.carousel.get(self.active_index())
    }

    fn backdrop_opacity(&self) -> f64 {
        self.entrance_opacity * self.drag.backdrop_opacity()
    }
}

/// Assembles a [`Lightbox`] from its collection, configuration and platform capabilities.
pub struct LightboxBuilder {
    items: Vec<String>,
    config: LightboxConfig,
    container: Option<Box<dyn ScrollContainer>>,
    observer: Option<Box<dyn ObservationBackend>>,
    pointer_gestures: bool,
}

impl LightboxBuilder {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            config: LightboxConfig::default(),
            container: None,
            observer: None,
            pointer_gestures: false,
        }
    }

    pub fn config(mut self, config: LightboxConfig) -> Self {
        self.config = config;
        self
    }

    pub fn container(mut self, container: impl ScrollContainer + 'static) -> Self {
        self.container = Some(Box::new(container));
        self
    }

    pub fn observer(mut self, observer: impl ObservationBackend + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Declare whether the platform delivers pointer-drag samples.
    pub fn pointer_gestures(mut self, available: bool) -> Self {
        self.pointer_gestures = available;
        self
    }

    pub fn mount(self) -> LightboxResult<Lightbox> {
        let observer = self
            .observer
            .filter(|observer| observer.is_supported())
            .ok_or(LightboxError::CapabilityMissing(
                Capability::IntersectionObservation,
            ))?;
        let container = self
            .container
            .ok_or(LightboxError::CapabilityMissing(Capability::ScrollContainer))?;
        if !self.pointer_gestures {
            return Err(LightboxError::CapabilityMissing(Capability::PointerGestures));
        }

        self.config.validate()?;
        let items = ItemCollection::new(self.items, self.config.duplicate_policy)?;
        let backdrop_color =
            resolve_backdrop_color(self.config.theme, self.config.backdrop_color.as_deref()).rgb();
        let group = GroupId::allocate();
        tracing::debug!(group = group.get(), items = items.len(), "lightbox mounted");

        Ok(Lightbox {
            group,
            thresholds: DismissThresholds::from_config(&self.config),
            config: self.config,
            items,
            backdrop_color: [backdrop_color.0, backdrop_color.1, backdrop_color.2],
            machine: StateMachine::new(),
            container,
            observer,
            tasks: TaskQueue::new(),
            next_cycle: 1,
            cycle: None,
        })
    }
}

/// Overlay lifecycle controller: the single owner of viewer state for one gallery.
pub struct Lightbox {
    group: GroupId,
    config: LightboxConfig,
    thresholds: DismissThresholds,
    items: ItemCollection,
    backdrop_color: [u8; 3],
    machine: StateMachine,
    container: Box<dyn ScrollContainer>,
    observer: Box<dyn ObservationBackend>,
    tasks: TaskQueue,
    next_cycle: u64,
    cycle: Option<OpenCycle>,
}

impl Lightbox {
    pub fn builder<I, S>(items: I) -> LightboxBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LightboxBuilder::new(items)
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn config(&self) -> &LightboxConfig {
        &self.config
    }

    pub fn items(&self) -> &ItemCollection {
        &self.items
    }

    pub fn state(&self) -> OverlayState {
        self.machine.state()
    }

    pub fn is_open(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn history(&self) -> &[StateTransition] {
        self.machine.history()
    }

    pub fn payload(&self) -> Option<&ViewerPayload> {
        self.cycle.as_ref().map(|cycle| &cycle.payload)
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn open(&mut self, identity: &str, index: usize) -> LightboxResult<()> {
        self.open_at(identity, index, Instant::now())
    }

    /// Open from the thumbnail `identity` at carousel position `index`.
    pub fn open_at(&mut self, identity: &str, index: usize, now: Instant) -> LightboxResult<()> {
        if let Some(cycle) = &self.cycle {
            let current = cycle.payload.source_identity.clone();
            return self.violation(PreconditionViolation::AlreadyOpen {
                current,
                requested: identity.to_string(),
            });
        }

        let carousel = self.items.carousel_for(identity);
        let initial_index = match carousel.mode() {
            CarouselMode::Single => 0,
            CarouselMode::Paged if index < carousel.len() => index,
            CarouselMode::Paged => {
                let len = carousel.len();
                self.violation(PreconditionViolation::IndexOutOfRange { index, len })?;
                len - 1
            }
        };
        if carousel.mode() == CarouselMode::Paged && carousel.get(initial_index) != Some(identity) {
            tracing::warn!(
                identity,
                index = initial_index,
                "opened identity does not match the item at the initial index"
            );
        }

        let sync = CarouselSync::new(initial_index, carousel.len());
        let mut tracker = IntersectionTracker::new(self.config.visible_ratio_threshold());
        tracker.set_on_enter(sync.enter_handler());
        for (position, item) in carousel.iter().enumerate() {
            let target = ObservedTarget::new(position, item);
            if let Err(err) = tracker.track(self.observer.as_mut(), target) {
                tracker.disconnect_all(self.observer.as_mut());
                return Err(err.into());
            }
        }

        self.machine.transition(OverlayEvent::Open)?;
        let id = CycleId(self.next_cycle);
        self.next_cycle += 1;
        let entrance = Tween::new(0.0, 1.0, now, self.config.entrance_duration());
        self.cycle = Some(OpenCycle {
            id,
            payload: ViewerPayload::new(identity, initial_index),
            carousel,
            sync,
            drag: DragController::new(self.thresholds),
            tracker,
            entrance_opacity: entrance.value_at(now),
            entrance,
        });
        tracing::info!(identity, index = initial_index, cycle = id.0, "lightbox opened");

        self.layout();
        Ok(())
    }

    /// Close issued by the embedding application.
    pub fn close(&mut self) -> LightboxResult<()> {
        self.close_with(OverlayEvent::ProgrammaticClose)
    }

    /// Close requested by the backdrop or the platform back action.
    pub fn request_close(&mut self) -> LightboxResult<()> {
        self.close_with(OverlayEvent::RequestClose)
    }

    fn close_with(&mut self, event: OverlayEvent) -> LightboxResult<()> {
        if self.cycle.is_none() {
            return self.violation(PreconditionViolation::AlreadyClosed);
        }
        self.machine.transition(event)?;
        if let Some(mut cycle) = self.cycle.take() {
            cycle.tracker.disconnect_all(self.observer.as_mut());
            tracing::info!(
                identity = %cycle.payload.source_identity,
                active = cycle.active_index(),
                cycle = cycle.id.0,
                ?event,
                "lightbox closed"
            );
        }
        Ok(())
    }

    /// Per-render hook: performs the one-time initial seek once the container is measured.
    pub fn layout(&mut self) -> Option<f64> {
        let cycle = self.cycle.as_mut()?;
        cycle.sync.seek_if_ready(self.container.as_mut())
    }

    pub fn drag_start(&mut self, sample: &DragSample) {
        let sample = self.measured_sample(sample);
        match self.cycle.as_mut() {
            Some(cycle) => cycle.drag.start(&sample),
            None => tracing::trace!("drag start while closed ignored"),
        }
    }

    pub fn drag_move(&mut self, sample: &DragSample) -> Option<f64> {
        let sample = self.measured_sample(sample);
        let cycle = self.cycle.as_mut()?;
        Some(cycle.drag.update(&sample))
    }

    /// Finish a drag. A commit closes the overlay before returning; the
    /// click-suppression flag is released on the next task tick.
    pub fn drag_end(&mut self, sample: &DragSample) -> LightboxResult<Option<DragVerdict>> {
        let sample = self.measured_sample(sample);
        let Some(cycle) = self.cycle.as_mut() else {
            tracing::trace!("drag end while closed ignored");
            return Ok(None);
        };
        let Some(verdict) = cycle.drag.end(&sample) else {
            return Ok(None);
        };
        self.tasks.post(cycle.id, TaskKind::ReleaseDragFlag);
        if verdict == DragVerdict::Commit {
            self.close_with(OverlayEvent::DragCommit)?;
        }
        Ok(Some(verdict))
    }

    /// A plain tap on a carousel item. Returns whether a close was scheduled.
    pub fn tap(&mut self) -> bool {
        let Some(cycle) = self.cycle.as_ref() else {
            return false;
        };
        if cycle.drag.is_dragging() {
            tracing::debug!("tap suppressed after drag release");
            return false;
        }
        if !self.tasks.contains(cycle.id, TaskKind::CloseFromTap) {
            self.tasks.post(cycle.id, TaskKind::CloseFromTap);
        }
        true
    }

    /// Run next-tick tasks posted before this call. Tasks from a cycle that
    /// has already ended are discarded. Returns how many tasks ran.
    pub fn run_pending_tasks(&mut self) -> LightboxResult<usize> {
        let mut ran = 0;
        for task in self.tasks.take_due() {
            let current = self.cycle.as_ref().map(|cycle| cycle.id);
            if current != Some(task.cycle) {
                tracing::trace!(?task, "stale task discarded");
                continue;
            }
            match task.kind {
                TaskKind::ReleaseDragFlag => {
                    if let Some(cycle) = self.cycle.as_mut() {
                        cycle.drag.release_drag_flag();
                    }
                }
                TaskKind::CloseFromTap => self.close_with(OverlayEvent::TapClose)?,
            }
            ran += 1;
        }
        Ok(ran)
    }

    /// Animation frame: steps the entrance fade and any settle animation.
    /// Returns whether anything is still animating.
    pub fn advance(&mut self, now: Instant) -> bool {
        let Some(cycle) = self.cycle.as_mut() else {
            return false;
        };
        cycle.entrance_opacity = cycle.entrance.value_at(now);
        let entering = !cycle.entrance.is_finished(now);
        let settling = cycle.drag.advance(now);
        entering || settling
    }

    /// Change the visible-percent threshold; an open carousel is re-observed.
    pub fn set_visible_threshold(&mut self, percent: f64) -> LightboxResult<()> {
        let mut candidate = self.config.clone();
        candidate.item_visible_percent_threshold = percent;
        candidate.validate()?;
        if let Some(cycle) = self.cycle.as_mut() {
            cycle
                .tracker
                .set_threshold(self.observer.as_mut(), candidate.visible_ratio_threshold())?;
        }
        self.config = candidate;
        Ok(())
    }

    pub fn projection(&self) -> Projection {
        let Some(cycle) = self.cycle.as_ref() else {
            return Projection::closed(self.backdrop_color);
        };
        let renderable = self
            .container
            .size()
            .is_some_and(|size| size.width.is_finite() && size.width > 0.0);
        let state = cycle.drag.state();
        Projection {
            is_open: true,
            renderable,
            active_index: Some(cycle.active_index()),
            active_identity: cycle.active_identity().map(str::to_string),
            source_identity: Some(cycle.payload.source_identity.clone()),
            item_count: cycle.carousel.len(),
            dismiss_progress: state.dismiss_progress,
            backdrop_opacity: cycle.backdrop_opacity(),
            backdrop_color: self.backdrop_color,
            drag_axis: Some(DragAxis::from(cycle.carousel.mode())),
            is_dragging: cycle.drag.is_dragging(),
        }
    }

    /// Opacity of the carousel item at `index`: the active item stays opaque,
    /// the others fade with the backdrop.
    pub fn item_opacity(&self, index: usize) -> Option<f64> {
        let cycle = self.cycle.as_ref()?;
        if index >= cycle.carousel.len() {
            return None;
        }
        if index == cycle.active_index() {
            Some(1.0)
        } else {
            Some(cycle.backdrop_opacity())
        }
    }

    /// Which element holds the transition token for `identity`.
    pub fn token_holder(&self, identity: &str) -> TokenHolder {
        match self.cycle.as_ref() {
            Some(cycle) if cycle.active_identity() == Some(identity) => TokenHolder::CarouselItem {
                index: cycle.active_index(),
            },
            _ => TokenHolder::Thumbnail,
        }
    }

    pub fn thumbnail_token(&self, identity: &str) -> Option<TransitionToken> {
        match self.token_holder(identity) {
            TokenHolder::Thumbnail => Some(TransitionToken::new(self.group, identity)),
            TokenHolder::CarouselItem { .. } => None,
        }
    }

    /// Token for the carousel item at `index`; only the active item has one.
    pub fn item_token(&self, index: usize) -> Option<TransitionToken> {
        let cycle = self.cycle.as_ref()?;
        if index != cycle.active_index() {
            return None;
        }
        let identity = cycle.carousel.get(index)?;
        Some(TransitionToken::new(self.group, identity))
    }

    /// Use the container's measured height when the sample carries no usable one.
    fn measured_sample(&self, sample: &DragSample) -> DragSample {
        if sample.container_height.is_finite() && sample.container_height > 0.0 {
            return *sample;
        }
        match self
            .container
            .size()
            .map(|size| size.height)
            .filter(|height| height.is_finite() && *height > 0.0)
        {
            Some(container_height) => DragSample {
                container_height,
                ..*sample
            },
            None => *sample,
        }
    }

    fn violation(&self, violation: PreconditionViolation) -> LightboxResult<()> {
        if self.config.strict_preconditions() {
            tracing::error!(%violation, "lightbox precondition violated");
            return Err(violation.into());
        }
        tracing::warn!(%violation, "lightbox precondition violated; ignoring");
        Ok(())
    }
}

impl std::fmt::Debug for Lightbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lightbox")
            .field("group", &self.group)
            .field("state", &self.machine.state())
            .field("items", &self.items.len())
            .field("pending_tasks", &self.tasks.len())
            .finish()
    }
}

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::platform::{ObservationBackend, ObservationError, ObservationId, ObserveRequest};

use super::entry::IntersectionEntry;

type EnterCallback = Box<dyn FnMut(&ObservedTarget, &IntersectionEntry)>;

/// A carousel item registered with the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedTarget {
    pub index: usize,
    pub identity: String,
}

impl ObservedTarget {
    pub fn new(index: usize, identity: impl Into<String>) -> Self {
        Self {
            index,
            identity: identity.into(),
        }
    }
}

/// Latest enter callback, read at delivery time so replacing it never touches subscriptions.
#[derive(Clone, Default)]
struct CallbackCell(Rc<RefCell<Option<EnterCallback>>>);

impl CallbackCell {
    fn replace(&self, callback: Option<EnterCallback>) {
        match self.0.try_borrow_mut() {
            Ok(mut slot) => *slot = callback,
            Err(_) => tracing::warn!("enter callback replaced from inside itself; ignoring"),
        }
    }

    fn invoke(&self, target: &ObservedTarget, entry: &IntersectionEntry) -> bool {
        let Ok(mut slot) = self.0.try_borrow_mut() else {
            tracing::warn!(index = target.index, "re-entrant intersection delivery dropped");
            return false;
        };
        match slot.as_mut() {
            Some(callback) => {
                callback(target, entry);
                true
            }
            None => false,
        }
    }
}

struct Subscription {
    target: ObservedTarget,
    threshold: f64,
    on_enter: CallbackCell,
    deliveries: Rc<Cell<u64>>,
}

/// Handle a backend uses to push entries for one observed item.
///
/// Holds only a weak reference: once the item is untracked, the threshold
/// changes, or the tracker is dropped, deliveries become no-ops.
#[derive(Clone)]
pub struct EntrySink {
    subscription: Weak<Subscription>,
}

impl EntrySink {
    /// Deliver one entry; returns whether an enter notification fired.
    pub fn deliver(&self, entry: &IntersectionEntry) -> bool {
        let Some(subscription) = self.subscription.upgrade() else {
            tracing::trace!("intersection entry delivered to a released observation");
            return false;
        };
        if !entry.qualifies(subscription.threshold) {
            return false;
        }
        subscription
            .deliveries
            .set(subscription.deliveries.get() + 1);
        subscription.on_enter.invoke(&subscription.target, entry)
    }

    pub fn is_live(&self) -> bool {
        self.subscription.strong_count() > 0
    }

    pub fn target_index(&self) -> Option<usize> {
        self.subscription.upgrade().map(|s| s.target.index)
    }
}

impl std::fmt::Debug for EntrySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntrySink")
            .field("target", &self.target_index())
            .finish()
    }
}

struct TrackedItem {
    id: ObservationId,
    subscription: Rc<Subscription>,
}

/// Root-scoped visibility tracking for carousel items.
pub struct IntersectionTracker {
    threshold: f64,
    on_enter: CallbackCell,
    deliveries: Rc<Cell<u64>>,
    tracked: BTreeMap<usize, TrackedItem>,
}

impl IntersectionTracker {
    /// `threshold` is the visible ratio in `(0, 1]` an item needs to count as entered.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            on_enter: CallbackCell::default(),
            deliveries: Rc::new(Cell::new(0)),
            tracked: BTreeMap::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_on_enter<F>(&self, callback: F)
    where
        F: FnMut(&ObservedTarget, &IntersectionEntry) + 'static,
    {
        self.on_enter.replace(Some(Box::new(callback)));
    }

    pub fn clear_on_enter(&self) {
        self.on_enter.replace(None);
    }

    pub fn track(
        &mut self,
        backend: &mut dyn ObservationBackend,
        target: ObservedTarget,
    ) -> Result<(), ObservationError> {
        if let Some(previous) = self.tracked.remove(&target.index) {
            backend.disconnect(previous.id);
        }
        let index = target.index;
        let subscription = Rc::new(Subscription {
            target: target.clone(),
            threshold: self.threshold,
            on_enter: self.on_enter.clone(),
            deliveries: Rc::clone(&self.deliveries),
        });
        let sink = EntrySink {
            subscription: Rc::downgrade(&subscription),
        };
        let request = ObserveRequest {
            target,
            threshold: self.threshold,
        };
        let id = backend.observe(request, sink)?;
        tracing::trace!(index, ?id, threshold = self.threshold, "observing carousel item");
        self.tracked.insert(index, TrackedItem { id, subscription });
        Ok(())
    }

    pub fn untrack(&mut self, backend: &mut dyn ObservationBackend, index: usize) -> bool {
        match self.tracked.remove(&index) {
            Some(item) => {
                backend.disconnect(item.id);
                true
            }
            None => false,
        }
    }

    /// Re-observe every tracked item with a new threshold; old sinks are released.
    ///
    /// If the backend rejects a re-observation, every item is observed again
    /// at the previous threshold and the rejection is returned.
    pub fn set_threshold(
        &mut self,
        backend: &mut dyn ObservationBackend,
        threshold: f64,
    ) -> Result<(), ObservationError> {
        if threshold == self.threshold {
            return Ok(());
        }
        let previous = self.threshold;
        let targets: Vec<ObservedTarget> = self
            .tracked
            .values()
            .map(|item| item.subscription.target.clone())
            .collect();
        let result = self.observe_all(backend, threshold, &targets);
        if let Err(err) = &result {
            tracing::warn!(%err, previous, threshold, "re-observe failed; restoring previous threshold");
            if let Err(restore) = self.observe_all(backend, previous, &targets) {
                tracing::error!(%restore, tracked = self.tracked.len(), "restoring observations failed");
            }
        }
        result
    }

    fn observe_all(
        &mut self,
        backend: &mut dyn ObservationBackend,
        threshold: f64,
        targets: &[ObservedTarget],
    ) -> Result<(), ObservationError> {
        self.disconnect_all(backend);
        self.threshold = threshold;
        for target in targets {
            self.track(backend, target.clone())?;
        }
        Ok(())
    }

    pub fn disconnect_all(&mut self, backend: &mut dyn ObservationBackend) {
        let count = self.tracked.len();
        for (_, item) in std::mem::take(&mut self.tracked) {
            backend.disconnect(item.id);
        }
        if count > 0 {
            tracing::trace!(count, "released carousel observations");
        }
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Qualifying entries seen across all subscriptions.
    pub fn qualifying_deliveries(&self) -> u64 {
        self.deliveries.get()
    }
}

impl std::fmt::Debug for IntersectionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntersectionTracker")
            .field("threshold", &self.threshold)
            .field("tracked", &self.tracked.keys().collect::<Vec<_>>())
            .finish()
    }
}

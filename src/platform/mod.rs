//! Capabilities the engine consumes from the embedding platform.
//!
//! The engine never renders or scrolls anything itself. It asks a
//! [`ScrollContainer`] for its measured size and to move its horizontal
//! offset, and it asks an [`ObservationBackend`] to report intersection
//! changes for each carousel item into an [`EntrySink`].

use std::fmt;

use thiserror::Error;

use crate::geometry::Size;
use crate::visibility::{EntrySink, ObservedTarget};

mod headless;

pub use headless::{HeadlessContainer, HeadlessObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    IntersectionObservation,
    PointerGestures,
    ScrollContainer,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::IntersectionObservation => "intersection observation",
            Capability::PointerGestures => "pointer gestures",
            Capability::ScrollContainer => "scroll container",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObservationError {
    #[error("observation backend rejected item #{index} ({identity}): {reason}")]
    Rejected {
        index: usize,
        identity: String,
        reason: String,
    },
}

/// The horizontally paged container hosting the carousel.
pub trait ScrollContainer {
    /// Current measured size, or `None` before the first layout pass.
    fn size(&self) -> Option<Size>;

    fn set_scroll_offset_x(&mut self, offset: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObservationId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct ObserveRequest {
    pub target: ObservedTarget,
    /// Visible ratio in `(0, 1]` at which the backend should report crossings.
    pub threshold: f64,
}

/// Root-scoped intersection observation, one registration per carousel item.
pub trait ObservationBackend {
    fn is_supported(&self) -> bool {
        true
    }

    fn observe(
        &mut self,
        request: ObserveRequest,
        sink: EntrySink,
    ) -> Result<ObservationId, ObservationError>;

    fn disconnect(&mut self, id: ObservationId);
}

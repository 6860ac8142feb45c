//! Overlay lifecycle: open/closed state, the per-cycle payload, and the
//! render projection consumed by the embedding UI.

use thiserror::Error;

mod controller;
mod payload;
mod projection;
mod transition;

pub use controller::{Lightbox, LightboxBuilder};
pub use payload::ViewerPayload;
pub use projection::{DragAxis, Projection};
pub use transition::{GroupId, TokenHolder, TransitionToken};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionViolation {
    #[error("overlay already open for {current:?}; open for {requested:?} ignored")]
    AlreadyOpen { current: String, requested: String },
    #[error("overlay is already closed")]
    AlreadyClosed,
    #[error("initial index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

mod drag;
mod sample;
mod velocity;

pub use drag::{DismissThresholds, DragController, DragPhase, DragState, DragVerdict};
pub use sample::DragSample;
pub use velocity::VelocityTracker;

pub mod animation;
pub mod carousel;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod logging;
pub mod overlay;
pub mod platform;
pub mod replay;
pub mod scheduler;
pub mod state;
pub mod theme;
pub mod visibility;

pub use config::{load_config, DuplicatePolicy, LightboxConfig};
pub use error::{LightboxError, LightboxResult};
pub use gesture::{DragSample, DragVerdict};
pub use overlay::{
    DragAxis, GroupId, Lightbox, LightboxBuilder, PreconditionViolation, Projection, TokenHolder,
    TransitionToken, ViewerPayload,
};
pub use platform::{Capability, ObservationBackend, ScrollContainer};
pub use theme::ThemeMode;

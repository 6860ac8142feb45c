use crate::config::ConfigError;
use crate::overlay::PreconditionViolation;
use crate::platform::{Capability, ObservationError};
use crate::state::StateError;
use thiserror::Error;

pub type LightboxResult<T> = std::result::Result<T, LightboxError>;

#[derive(Debug, Error)]
pub enum LightboxError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("precondition violated: {0}")]
    Precondition(#[from] PreconditionViolation),
    #[error("required platform capability is missing: {0}")]
    CapabilityMissing(Capability),
    #[error(transparent)]
    Observation(#[from] ObservationError),
    #[error(transparent)]
    State(#[from] StateError),
}

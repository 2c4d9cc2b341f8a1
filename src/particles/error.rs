//! Particle subsystem error handling
//!
//! Misuse of the pool (unknown channels, wrong call order) is a programming
//! error. The `try_*` entry points report it as a [`ParticleError`]; the plain
//! entry points panic with the same message.

use crate::particles::channel::{ChannelKey, ChannelKind};

/// Type alias for particle operation results
pub type ParticleResult<T> = Result<T, ParticleError>;

/// Particle system errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParticleError {
    #[error("Channel {key:?} was never registered with the pool")]
    UnregisteredChannel { key: ChannelKey },

    #[error("Channel {key:?} holds {found:?} elements, requested {expected:?}")]
    ChannelKindMismatch {
        key: ChannelKey,
        expected: ChannelKind,
        found: ChannelKind,
    },

    #[error("Particle pool used before initialize()")]
    NotInitialized,

    #[error("Particle pool already initialized")]
    AlreadyInitialized,

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

/// Create an invalid configuration error
pub fn invalid_config(field: &'static str, reason: impl std::fmt::Display) -> ParticleError {
    ParticleError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

//! Error types for Coil operations.
//!
//! Malformed configuration and missing collaborators are errors the caller
//! must handle. Misuse inside a live simulation loop (double release, double
//! resolution) is reported through these types too, but callers are
//! expected to log and carry on rather than abort the loop.

use crate::types::{BodyHandle, EntityKind, PoolHandle};
use thiserror::Error;

/// Result type for Coil operations.
pub type Result<T> = std::result::Result<T, CoilError>;

/// Errors that can occur during Coil operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoilError {
    /// Configuration rejected at construction.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Object pool misuse or exhaustion.
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    /// A collaborator required by the configured mode was not supplied.
    #[error("Unconfigured dependency: {0} is required but was not supplied")]
    Unconfigured(&'static str),

    /// A body handle the physics world does not know about.
    #[error("Unknown rigid body: {0}")]
    UnknownBody(BodyHandle),

    /// A detector that already reached its terminal state was resolved again.
    #[error("Detector already resolved")]
    AlreadyResolved,
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid value.
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Out of range.
    #[error("{field} out of range: {value} (must be {min}-{max})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Two settings that cannot be combined.
    #[error("Incompatible settings: {0}")]
    Incompatible(String),
}

/// Object pool errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolError {
    /// No pool registered for this kind.
    #[error("No pool registered for kind '{0}'")]
    UnknownKind(EntityKind),

    /// The handle was never acquired from this pool.
    #[error("Handle {} ({}) was not acquired from this pool", .0.instance, .0.kind)]
    NotAcquired(PoolHandle),

    /// The handle was already returned to its pool.
    #[error("Handle {} ({}) was already released", .0.instance, .0.kind)]
    AlreadyReleased(PoolHandle),

    /// The owner has no handle left to release.
    #[error("Entity has no live pool handle")]
    NoHandle,
}

// Convenience constructors
impl CoilError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CoilError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        CoilError::Config(ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        })
    }

    pub fn unconfigured(dependency: &'static str) -> Self {
        CoilError::Unconfigured(dependency)
    }

    /// Whether this error reports misuse rather than a hard failure.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            CoilError::Pool(PoolError::AlreadyReleased(_))
                | CoilError::Pool(PoolError::NotAcquired(_))
                | CoilError::Pool(PoolError::NoHandle)
                | CoilError::AlreadyResolved
        )
    }
}

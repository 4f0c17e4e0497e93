use kinetic_core::state::LengthMismatch;
use kinetic_solvers::transient::rkf78;
use thiserror::Error;

/// Errors raised when an entity or system is configured inconsistently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} must be finite")]
    NonFinite(&'static str),

    #[error("{0} must be positive")]
    NonPositive(&'static str),

    #[error("{0} must be non-negative")]
    Negative(&'static str),

    #[error("inertia tensor must be invertible")]
    SingularInertia,

    #[error("initial state must be finite")]
    NonFiniteState,

    #[error(transparent)]
    StateLength(#[from] LengthMismatch),

    #[error("node `{node}` links to unknown node `{target}`")]
    UnknownLink { node: String, target: String },
}

/// Errors that can occur while stepping an entity.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Solver(#[from] rkf78::Error),

    #[error("entity has not been set up")]
    NotSetUp,

    #[error("neighbor `{name}` is not part of the system")]
    UnknownNeighbor { name: String },
}

pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite(name))
    }
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if finite(name, value)? > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive(name))
    }
}

pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if finite(name, value)? >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Negative(name))
    }
}

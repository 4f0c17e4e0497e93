use std::error::Error as StdError;

/// Errors that can occur while advancing the integrator.
///
/// Every variant except [`Error::InvalidStep`] marks the integrator as
/// unsuccessful until it is reinitialized.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("dynamics error: {0}")]
    Dynamics(#[source] Box<dyn StdError + Send + Sync>),

    #[error("step size {step:e} too small to make progress at t = {time}")]
    StepSizeTooSmall { time: f64, step: f64 },

    #[error("exceeded {limit} sub-steps before reaching t = {target}")]
    TooManySteps { target: f64, limit: usize },

    #[error("state became non-finite at t = {time}")]
    NonFinite { time: f64 },

    #[error("time step must be finite and positive, got {dt}")]
    InvalidStep { dt: f64 },
}

impl Error {
    pub(crate) fn dynamics<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Dynamics(Box::new(err))
    }
}

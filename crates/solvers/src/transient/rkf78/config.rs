use thiserror::Error;

/// Configuration for the RKF7(8) integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    rel_tol: f64,
    abs_tol: f64,
    max_steps: usize,
}

/// Errors that can occur when validating an integrator config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rel_tol must be finite and non-negative")]
    RelTol,

    #[error("abs_tol must be finite and positive")]
    AbsTol,

    #[error("max_steps must be at least one")]
    MaxSteps,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1e-6, 1e-12, 100_000).unwrap()
    }
}

impl Config {
    /// Creates a new config with validated tolerances.
    ///
    /// The scaled local error of each component is
    /// `|err| / (abs_tol + rel_tol * |y|)`, and a sub-step is accepted when
    /// the largest scaled error is at most one.
    /// `max_steps` bounds the number of attempted sub-steps in one advance.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is negative or non-finite, if
    /// `abs_tol` is zero, or if `max_steps` is zero.
    pub fn new(rel_tol: f64, abs_tol: f64, max_steps: usize) -> Result<Self, ConfigError> {
        if !rel_tol.is_finite() || rel_tol < 0.0 {
            return Err(ConfigError::RelTol);
        }
        if !abs_tol.is_finite() || abs_tol <= 0.0 {
            return Err(ConfigError::AbsTol);
        }
        if max_steps == 0 {
            return Err(ConfigError::MaxSteps);
        }

        Ok(Self {
            rel_tol,
            abs_tol,
            max_steps,
        })
    }

    /// Returns the relative tolerance.
    #[must_use]
    pub fn rel_tol(&self) -> f64 {
        self.rel_tol
    }

    /// Returns the absolute tolerance.
    #[must_use]
    pub fn abs_tol(&self) -> f64 {
        self.abs_tol
    }

    /// Returns the maximum number of sub-steps attempted per advance.
    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }
}

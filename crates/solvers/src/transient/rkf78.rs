//! Adaptive Runge-Kutta-Fehlberg 7(8) integrator.
//!
//! # Algorithm
//!
//! Each sub-step evaluates the 13 stages of the Fehlberg 7(8) pair, propagates
//! the eighth-order solution, and uses the difference to the embedded
//! seventh-order solution as the local error estimate. A sub-step is accepted
//! when the largest component error, scaled by `abs_tol + rel_tol * |y|`, is
//! at most one. The next sub-step size follows an I-controller:
//!
//! ```text
//! h_next = h * clamp(0.9 * err^(-1/8), 0.2, 5.0)
//! ```
//!
//! [`Integrator::advance`] sub-steps internally and always lands on exactly
//! `t + dt`: the final sub-step is shortened to reach the target and the clock
//! is set to the target rather than accumulated.
//!
//! # History
//!
//! The step-size estimate carried between advance calls is the integrator's
//! only history. [`Integrator::set_initial_value`] discards it, so a
//! reinitialized integrator behaves exactly like a fresh one.
//!
//! # Failure
//!
//! A failed advance leaves state and time untouched and latches
//! [`Status::Unsuccessful`]. Subsequent advances return [`Outcome::Stalled`]
//! until the integrator is reinitialized.

mod config;
mod error;
mod outcome;
mod tableau;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError};
pub use error::Error;
pub use outcome::{Outcome, Status};

use kinetic_core::{Dynamics, state};
use tracing::debug;

use tableau::{A, B, B_ERR, C, STAGES};

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;
const EXPONENT: f64 = 1.0 / 8.0;

/// An adaptive integrator that owns one state vector and its clock.
#[derive(Debug, Clone)]
pub struct Integrator<const N: usize> {
    config: Config,
    state: [f64; N],
    time: f64,
    step_hint: Option<f64>,
    status: Status,
    evaluations: u64,
}

impl<const N: usize> Default for Integrator<N> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<const N: usize> Integrator<N> {
    /// Creates an integrator at `t = 0` with a zero state.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: [0.0; N],
            time: 0.0,
            step_hint: None,
            status: Status::Successful,
            evaluations: 0,
        }
    }

    /// Replaces the state and time and discards all adaptation history.
    ///
    /// Also clears a latched failure.
    pub fn set_initial_value(&mut self, state: [f64; N], time: f64) {
        self.state = state;
        self.time = time;
        self.step_hint = None;
        self.status = Status::Successful;
    }

    /// Advances the state from `t` to exactly `t + dt`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStep`] if `dt` is not finite and positive.
    /// Any other error means the advance failed: state and time are
    /// unchanged and the integrator is now [`Status::Unsuccessful`].
    pub fn advance<D>(
        &mut self,
        dynamics: &D,
        neighbors: &D::Neighbors,
        dt: f64,
    ) -> Result<Outcome, Error>
    where
        D: Dynamics<N> + ?Sized,
    {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::InvalidStep { dt });
        }
        if self.status == Status::Unsuccessful {
            return Ok(Outcome::Stalled);
        }

        let target = self.time + dt;
        match self.integrate(dynamics, neighbors, target) {
            Ok((state, step_hint)) => {
                self.state = state;
                self.time = target;
                self.step_hint = Some(step_hint);
                Ok(Outcome::Advanced)
            }
            Err(err) => {
                debug!(time = self.time, dt, %err, "integrator advance failed");
                self.status = Status::Unsuccessful;
                Err(err)
            }
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &[f64; N] {
        &self.state
    }

    /// Returns the current time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.status == Status::Successful
    }

    /// Returns the total number of derivative evaluations made so far.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sub-steps from the current time to `target`.
    ///
    /// Returns the state at `target` and the step size to try next.
    fn integrate<D>(
        &mut self,
        dynamics: &D,
        neighbors: &D::Neighbors,
        target: f64,
    ) -> Result<([f64; N], f64), Error>
    where
        D: Dynamics<N> + ?Sized,
    {
        let mut t = self.time;
        let mut y = self.state;
        let mut h = self.step_hint.unwrap_or(target - t);
        let min_step = 16.0 * f64::EPSILON * t.abs().max(target.abs());

        for _ in 0..self.config.max_steps() {
            let remaining = target - t;
            let last = h >= remaining;
            let step = if last { remaining } else { h };

            let (next, error) = self.trial(dynamics, neighbors, t, &y, step)?;
            let factor = step_factor(error);

            if error <= 1.0 {
                if !state::is_finite(&next) {
                    return Err(Error::NonFinite { time: t + step });
                }
                y = next;

                if last {
                    // A shortened final sub-step says nothing about the
                    // step size the dynamics will tolerate next time.
                    let hint = if step < h { h } else { step * factor };
                    return Ok((y, hint));
                }

                t += step;
                h = step * factor;
            } else {
                h = step * factor;
                if h < min_step {
                    return Err(Error::StepSizeTooSmall { time: t, step: h });
                }
            }
        }

        Err(Error::TooManySteps {
            target,
            limit: self.config.max_steps(),
        })
    }

    /// Takes one trial sub-step of size `h` from `(t, y)`.
    ///
    /// Returns the eighth-order solution and its scaled error norm.
    fn trial<D>(
        &mut self,
        dynamics: &D,
        neighbors: &D::Neighbors,
        t: f64,
        y: &[f64; N],
        h: f64,
    ) -> Result<([f64; N], f64), Error>
    where
        D: Dynamics<N> + ?Sized,
    {
        let mut k = [[0.0; N]; STAGES];

        for i in 0..STAGES {
            let mut stage = *y;
            for (a, kj) in A[i].iter().zip(&k[..i]) {
                if *a == 0.0 {
                    continue;
                }
                for (s, rate) in stage.iter_mut().zip(kj) {
                    *s += h * a * rate;
                }
            }

            self.evaluations += 1;
            k[i] = dynamics
                .derivative(t + C[i] * h, &stage, neighbors)
                .map_err(Error::dynamics)?;
        }

        let mut next = *y;
        let mut error: f64 = 0.0;

        for n in 0..N {
            let mut increment = 0.0;
            let mut estimate = 0.0;
            for (i, stage) in k.iter().enumerate() {
                increment += B[i] * stage[n];
                estimate += B_ERR[i] * stage[n];
            }
            next[n] += h * increment;

            let scale = self.config.abs_tol()
                + self.config.rel_tol() * y[n].abs().max(next[n].abs());
            let scaled = (h * estimate).abs() / scale;

            // NaN must register as a failed trial, not be ignored by `max`.
            if scaled.is_nan() {
                error = f64::INFINITY;
            } else {
                error = error.max(scaled);
            }
        }

        Ok((next, error))
    }
}

/// Step-size multiplier for a scaled error norm.
fn step_factor(error: f64) -> f64 {
    if error == 0.0 {
        MAX_FACTOR
    } else if !error.is_finite() {
        MIN_FACTOR
    } else {
        (SAFETY * error.powf(-EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR)
    }
}

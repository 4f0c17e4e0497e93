//! Capability traits for cross-model observers.
//!
//! These traits abstract over run-specific event and action types, so an
//! observer can be written once and reused across systems of different
//! members.
//!
//! # Event traits
//!
//! - [`HasElapsed`] — events that carry the simulation time
//! - [`HasFailures`] — events that report per-member step failures
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use kinetic_core::Observer;
//! use kinetic_observers::traits::{CanStopEarly, HasElapsed};
//!
//! struct StopAt {
//!     time: f64,
//! }
//!
//! impl<E: HasElapsed, A: CanStopEarly> Observer<E, A> for StopAt {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.elapsed() >= self.time).then(A::stop_early)
//!     }
//! }
//! ```

use kinetic_models::system::{self, Member};

/// An event that carries the simulation time.
pub trait HasElapsed {
    /// Returns the simulation time after the event, in seconds.
    fn elapsed(&self) -> f64;
}

/// An event that reports per-member step failures.
pub trait HasFailures {
    /// Returns the number of members that failed to step.
    fn failure_count(&self) -> usize;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the run early.
    fn stop_early() -> Self;
}

// --- system::Event ---

impl<M: Member> HasElapsed for system::Event<'_, M> {
    fn elapsed(&self) -> f64 {
        self.system.elapsed()
    }
}

impl<M> HasFailures for system::Event<'_, M> {
    fn failure_count(&self) -> usize {
        self.report.failures().count()
    }
}

// --- CanStopEarly impls ---

impl CanStopEarly for system::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

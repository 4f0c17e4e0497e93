//! Solvers for transient problems, advancing a state vector through time.
//!
//! A [`Dynamics`] value maps `(time, state, neighbors)` to a rate vector.
//! Solvers in this module own the state and clock and move them forward.
//!
//! # Solvers
//!
//! - [`rkf78`] — adaptive, embedded order-8 integrator with per-call history
//!   that is discarded on reinitialization
//!
//! [`Dynamics`]: kinetic_core::Dynamics

pub mod rkf78;

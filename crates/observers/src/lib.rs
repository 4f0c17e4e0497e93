//! Reusable observers for the Kinetic framework.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across systems of different members.
//!
//! # Modules
//!
//! - [`traits`] — Capability traits for cross-model observers
//!   ([`HasElapsed`], [`HasFailures`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`Recorder`] — collects named `(time, value)` traces for later analysis
//! - [`SeparationMonitor`] — tracks the distance between two gravitating
//!   bodies and stops the run if it leaves a band
//! - [`FailFast`] — stops at the first tick with a failing member
//!
//! [`Observer`]: kinetic_core::Observer
//! [`HasElapsed`]: traits::HasElapsed
//! [`HasFailures`]: traits::HasFailures
//! [`CanStopEarly`]: traits::CanStopEarly

mod monitor;
mod recorder;
pub mod traits;

pub use monitor::{FailFast, SeparationMonitor};
pub use recorder::{Recorder, Traceable};

//! Core traits and types for the Kinetic framework.
//!
//! This crate defines the shared abstractions that integrators, entities, and
//! observers build on:
//!
//! - [`Dynamics`] — a pure derivative function over a fixed-length state vector
//! - [`CollisionPolicy`] — a discrete-event detector and corrector applied
//!   after each integration step
//! - [`Observer`] — receives run events and optionally returns control actions
//! - [`SingularGeometry`] — the failure raised when a derivative would divide
//!   by a vanishing length
//! - [`state`] — helpers for reading and writing contiguous state blocks

mod collision;
mod dynamics;
mod geometry;
mod observer;
pub mod state;

pub use collision::{CollisionPolicy, Correction};
pub use dynamics::Dynamics;
pub use geometry::SingularGeometry;
pub use observer::Observer;

//! Physical models for the Kinetic framework.
//!
//! # Modules
//!
//! - [`projectile`] — planar ballistics with optional air drag
//! - [`fall`] — one-dimensional fall and the bouncing-ball collision policy
//! - [`gravitation`] — point masses under mutual gravitation
//! - [`spring`] — point masses joined by damped springs
//! - [`rigid_body`] — a tethered rigid body with full orientation
//! - [`system`] — named members advanced together in two-phase ticks
//! - [`checkpoint`] — saving and resuming a fall between runs
//! - [`playback`] — pause, resume, and single-step control
//!
//! Every model plugs into the generic [`Entity`], which owns an adaptive
//! integrator and applies termination and collision rules after each step.

pub mod checkpoint;
mod entity;
mod error;
pub mod fall;
pub mod gravitation;
pub mod playback;
pub mod projectile;
pub mod rigid_body;
pub mod spring;
pub mod system;
pub mod units;

pub use entity::{Contact, Entity, Floor, StepReport};
pub use error::{ConfigError, StepError};
pub use system::System;

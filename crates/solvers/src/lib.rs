//! Numerical solvers for the Kinetic framework.
//!
//! - [`transient::rkf78`] — adaptive Runge-Kutta-Fehlberg 7(8) integrator that
//!   advances a fixed-length state by exactly the requested time step

pub mod transient;

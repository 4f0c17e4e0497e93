//! One-dimensional vertical motion under gravity, and the floor bounce.
//!
//! State layout: `[y, vy]`.

use std::convert::Infallible;

use glam::DVec3;
use kinetic_core::{CollisionPolicy, Correction, Dynamics};
use uom::si::{
    acceleration::meter_per_second_squared,
    f64::{Acceleration, Length},
    length::meter,
};

use crate::{
    ConfigError,
    error::{finite, positive},
};

/// Clearance above the floor applied after a bounce, in meters.
pub const DEFAULT_CLEARANCE: f64 = 1e-5;

/// Uniform gravity along `-y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fall {
    gravity: f64,
}

impl Fall {
    /// # Errors
    ///
    /// Returns an error if `gravity` is not finite.
    pub fn new(gravity: Acceleration) -> Result<Self, ConfigError> {
        Ok(Self {
            gravity: finite("gravity", gravity.value)?,
        })
    }

    /// Creates fall dynamics with gravity in SI units (m/s²).
    ///
    /// # Errors
    ///
    /// Returns an error if `gravity` is not finite.
    pub fn from_si(gravity: f64) -> Result<Self, ConfigError> {
        Self::new(Acceleration::new::<meter_per_second_squared>(gravity))
    }

    #[must_use]
    pub fn gravity(&self) -> f64 {
        self.gravity
    }
}

impl Dynamics<2> for Fall {
    type Neighbors = ();
    type Error = Infallible;

    fn derivative(&self, _time: f64, y: &[f64; 2], _: &()) -> Result<[f64; 2], Infallible> {
        Ok([y[1], -self.gravity])
    }

    fn position(&self, y: &[f64; 2]) -> DVec3 {
        DVec3::new(0.0, y[0], 0.0)
    }
}

/// Elastic bounce off the floor at `y = 0`.
///
/// A ball released from rest at `drop_height` reaches the floor with speed
/// `√(2·g·h)`. On contact the ball is placed `clearance` above the floor and
/// launched upward at that speed, so every bounce returns to the drop height
/// regardless of how far the integrator overshot the floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    clearance: f64,
    rebound_speed: f64,
}

impl Bounce {
    /// Creates a bounce for a ball dropped from rest.
    ///
    /// # Errors
    ///
    /// Returns an error if `drop_height` or `gravity` is not positive.
    pub fn new(drop_height: Length, gravity: Acceleration) -> Result<Self, ConfigError> {
        let height = positive("drop height", drop_height.value)?;
        let gravity = positive("gravity", gravity.value)?;

        Ok(Self {
            clearance: DEFAULT_CLEARANCE,
            rebound_speed: (2.0 * gravity * height).sqrt(),
        })
    }

    /// Creates a bounce from SI values (m and m/s²).
    ///
    /// # Errors
    ///
    /// Returns an error if `drop_height` or `gravity` is not positive.
    pub fn from_si(drop_height: f64, gravity: f64) -> Result<Self, ConfigError> {
        Self::new(
            Length::new::<meter>(drop_height),
            Acceleration::new::<meter_per_second_squared>(gravity),
        )
    }

    /// Sets the post-bounce clearance above the floor.
    ///
    /// # Errors
    ///
    /// Returns an error if `clearance` is not positive.
    pub fn with_clearance(mut self, clearance: Length) -> Result<Self, ConfigError> {
        self.clearance = positive("clearance", clearance.value)?;
        Ok(self)
    }

    #[must_use]
    pub fn clearance(&self) -> f64 {
        self.clearance
    }

    #[must_use]
    pub fn rebound_speed(&self) -> f64 {
        self.rebound_speed
    }
}

impl CollisionPolicy<2> for Bounce {
    fn is_collision(&self, state: &[f64; 2]) -> bool {
        state[0] <= 0.0
    }

    fn respond(&self, _state: &[f64; 2], time: f64) -> Correction<2> {
        Correction {
            state: [self.clearance, self.rebound_speed],
            time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn rebound_speed_conserves_energy() {
        let bounce = Bounce::from_si(100.0, 9.8).unwrap();
        assert_relative_eq!(bounce.rebound_speed(), (2.0 * 9.8 * 100.0_f64).sqrt());
        assert_eq!(bounce.clearance(), DEFAULT_CLEARANCE);
    }

    #[test]
    fn floor_contact_is_detected_at_or_below_zero() {
        let bounce = Bounce::from_si(1.0, 9.8).unwrap();
        assert!(bounce.is_collision(&[0.0, -1.0]));
        assert!(bounce.is_collision(&[-0.2, -1.0]));
        assert!(!bounce.is_collision(&[1e-9, -1.0]));
    }

    #[test]
    fn correction_clears_the_floor() {
        let bounce = Bounce::from_si(100.0, 9.8)
            .unwrap()
            .with_clearance(Length::new::<meter>(0.01))
            .unwrap();

        let corrected = bounce.respond(&[-0.3, -44.0], 4.5);

        assert_eq!(corrected.state, [0.01, bounce.rebound_speed()]);
        assert_eq!(corrected.time, 4.5);
        assert!(!bounce.is_collision(&corrected.state));
    }

    #[test]
    fn rejects_non_positive_inputs() {
        assert_eq!(
            Bounce::from_si(0.0, 9.8),
            Err(ConfigError::NonPositive("drop height"))
        );
        assert_eq!(
            Bounce::from_si(10.0, -9.8),
            Err(ConfigError::NonPositive("gravity"))
        );
        assert_eq!(Fall::from_si(f64::INFINITY), Err(ConfigError::NonFinite("gravity")));
    }

    #[test]
    fn fall_rate() {
        let fall = Fall::from_si(9.8).unwrap();
        assert_eq!(fall.derivative(0.0, &[10.0, 2.0], &()).unwrap(), [2.0, -9.8]);
    }
}

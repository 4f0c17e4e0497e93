//! A point-mass projectile in a vertical plane, with optional air drag.
//!
//! State layout: `[x, y, vx, vy]`.

use std::convert::Infallible;

use glam::{DVec2, DVec3};
use kinetic_core::{Dynamics, state};
use uom::si::{
    acceleration::meter_per_second_squared,
    angle::{degree, radian},
    f64::{Acceleration, Angle, Frequency, ReciprocalLength, Velocity},
    frequency::hertz,
    reciprocal_length::reciprocal_meter,
    velocity::meter_per_second,
};

use crate::{
    ConfigError, Floor,
    error::{finite, non_negative},
};

/// Air resistance acting on the projectile, expressed per unit mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drag {
    None,

    /// Deceleration `γ·v`, proportional to velocity.
    Linear(Frequency),

    /// Deceleration `k·|v|²` directed against the velocity.
    Quadratic(ReciprocalLength),
}

impl Drag {
    /// Creates linear drag from `γ` in SI units (1/s).
    #[must_use]
    pub fn linear_si(gamma: f64) -> Self {
        Self::Linear(Frequency::new::<hertz>(gamma))
    }

    /// Creates quadratic drag from `k` in SI units (1/m).
    #[must_use]
    pub fn quadratic_si(k: f64) -> Self {
        Self::Quadratic(ReciprocalLength::new::<reciprocal_meter>(k))
    }

    /// Returns the drag deceleration for velocity `v`.
    ///
    /// At zero speed the drag direction is undefined and the deceleration is zero.
    fn deceleration(&self, v: DVec2) -> DVec2 {
        match self {
            Self::None => DVec2::ZERO,
            Self::Linear(gamma) => gamma.value * v,
            Self::Quadratic(k) => {
                let speed = v.length();
                if speed == 0.0 {
                    DVec2::ZERO
                } else {
                    k.value * speed * v
                }
            }
        }
    }

    fn coefficient(&self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Linear(gamma) => gamma.value,
            Self::Quadratic(k) => k.value,
        }
    }
}

/// Physical parameters of a projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub gravity: Acceleration,
    pub drag: Drag,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            gravity: Acceleration::new::<meter_per_second_squared>(9.81),
            drag: Drag::linear_si(1e-4),
        }
    }
}

impl Parameters {
    /// Sets gravity from a `uom::Acceleration`.
    #[must_use]
    pub fn gravity(mut self, gravity: Acceleration) -> Self {
        self.gravity = gravity;
        self
    }

    /// Sets gravity in SI units (m/s²).
    #[must_use]
    pub fn gravity_si(self, gravity: f64) -> Self {
        self.gravity(Acceleration::new::<meter_per_second_squared>(gravity))
    }

    #[must_use]
    pub fn drag(mut self, drag: Drag) -> Self {
        self.drag = drag;
        self
    }
}

/// Projectile dynamics: uniform gravity along `-y` plus drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ballistics {
    gravity: f64,
    drag: Drag,
}

impl Ballistics {
    /// Creates projectile dynamics from validated parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if gravity is non-finite or the drag coefficient is
    /// negative or non-finite.
    pub fn new(parameters: Parameters) -> Result<Self, ConfigError> {
        let gravity = finite("gravity", parameters.gravity.value)?;
        non_negative("drag coefficient", parameters.drag.coefficient())?;

        Ok(Self {
            gravity,
            drag: parameters.drag,
        })
    }

    #[must_use]
    pub fn drag(&self) -> Drag {
        self.drag
    }
}

impl Dynamics<4> for Ballistics {
    type Neighbors = ();
    type Error = Infallible;

    fn derivative(&self, _time: f64, y: &[f64; 4], _: &()) -> Result<[f64; 4], Infallible> {
        let velocity = state::vec2_at(y, 2);
        let acceleration = DVec2::new(0.0, -self.gravity) - self.drag.deceleration(velocity);

        Ok([velocity.x, velocity.y, acceleration.x, acceleration.y])
    }

    fn position(&self, y: &[f64; 4]) -> DVec3 {
        state::vec2_at(y, 0).extend(0.0)
    }
}

/// Returns the state of a projectile launched from `origin`.
///
/// `elevation` is measured counterclockwise from the `+x` axis.
#[must_use]
pub fn launch(origin: DVec2, speed: Velocity, elevation: Angle) -> [f64; 4] {
    let speed = speed.get::<meter_per_second>();
    let (sin, cos) = elevation.get::<radian>().sin_cos();
    [origin.x, origin.y, speed * cos, speed * sin]
}

/// Returns the launch state with speed in m/s and elevation in degrees.
#[must_use]
pub fn launch_si(origin: DVec2, speed: f64, elevation_degrees: f64) -> [f64; 4] {
    launch(
        origin,
        Velocity::new::<meter_per_second>(speed),
        Angle::new::<degree>(elevation_degrees),
    )
}

/// The termination floor used for projectiles: stop once `y ≤ -1`.
#[must_use]
pub fn ground() -> Floor {
    Floor {
        index: 1,
        level: -1.0,
    }
}

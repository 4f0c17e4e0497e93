//! Newtonian gravitation between point masses in a plane.
//!
//! State layout per body: `[x, y, vx, vy]`.
//!
//! Each body integrates against the frozen positions and masses of every
//! other body in the tick's snapshot. For two bodies the acceleration of
//! body A is `G·m_B·d/r³` with `d = pos_B − pos_A`.

use glam::{DVec2, DVec3};
use kinetic_core::{Dynamics, SingularGeometry, state};
use kinetic_solvers::transient::rkf78::Config;
use uom::si::{f64::Mass, mass::kilogram};

use crate::{
    ConfigError, Entity, StepError, StepReport, System,
    error::positive,
    system::{Member, World},
    units::{GravitationalConstant, gravitational_constant_si},
};

/// Newton's gravitational constant in m³/(kg·s²).
pub const G: f64 = 6.674e-11;

pub const EARTH_MASS: f64 = 5.972e24;

pub const MOON_MASS: f64 = 7.34767309e22;

/// Mean Earth–Moon distance in meters.
pub const EARTH_MOON_DISTANCE: f64 = 384_400_000.0;

/// Initial lunar speed, perpendicular to the Earth–Moon line, in m/s.
pub const MOON_SPEED: f64 = 1000.0;

/// Time step of the Earth–Moon scenario, in seconds.
pub const EARTH_MOON_DT: f64 = 10.0;

/// What other bodies see of a body during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attractor {
    pub position: DVec2,
    pub mass: f64,
}

/// Gravitational attraction toward a set of other bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravitation {
    constant: f64,
}

impl Default for Gravitation {
    fn default() -> Self {
        Self { constant: G }
    }
}

impl Gravitation {
    /// # Errors
    ///
    /// Returns an error if `constant` is not positive.
    pub fn new(constant: GravitationalConstant) -> Result<Self, ConfigError> {
        Ok(Self {
            constant: positive("gravitational constant", constant.value)?,
        })
    }

    /// Creates gravitation with the constant in SI units (m³/(kg·s²)).
    ///
    /// # Errors
    ///
    /// Returns an error if `constant` is not positive.
    pub fn from_si(constant: f64) -> Result<Self, ConfigError> {
        Self::new(gravitational_constant_si(constant))
    }

    #[must_use]
    pub fn constant(&self) -> f64 {
        self.constant
    }
}

impl Dynamics<4> for Gravitation {
    type Neighbors = [Attractor];
    type Error = SingularGeometry;

    fn derivative(
        &self,
        _time: f64,
        y: &[f64; 4],
        attractors: &[Attractor],
    ) -> Result<[f64; 4], SingularGeometry> {
        let position = state::vec2_at(y, 0);

        let mut acceleration = DVec2::ZERO;
        for attractor in attractors {
            let d = attractor.position - position;
            let r_squared = d.length_squared();
            if r_squared == 0.0 {
                return Err(SingularGeometry::CoincidentBodies);
            }
            acceleration += self.constant * attractor.mass * d / (r_squared * r_squared.sqrt());
        }

        Ok([y[2], y[3], acceleration.x, acceleration.y])
    }

    fn position(&self, y: &[f64; 4]) -> DVec3 {
        state::vec2_at(y, 0).extend(0.0)
    }
}

/// A gravitating point mass.
#[derive(Debug, Clone)]
pub struct HeavenlyBody {
    entity: Entity<Gravitation, 4>,
    mass: f64,
}

impl HeavenlyBody {
    /// # Errors
    ///
    /// Returns an error if `mass` is not positive.
    pub fn new(mass: Mass, gravitation: Gravitation) -> Result<Self, ConfigError> {
        Ok(Self {
            entity: Entity::new(gravitation),
            mass: positive("mass", mass.value)?,
        })
    }

    /// Creates a body with mass in kilograms and the standard constant.
    ///
    /// # Errors
    ///
    /// Returns an error if `mass` is not positive.
    pub fn from_si(mass: f64) -> Result<Self, ConfigError> {
        Self::new(Mass::new::<kilogram>(mass), Gravitation::default())
    }

    /// Replaces the integrator configuration.
    ///
    /// The body must be set up again afterwards.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.entity = self.entity.with_config(config);
        self
    }

    /// Places the body, discarding integrator history.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is not finite.
    pub fn setup(&mut self, position: DVec2, velocity: DVec2, time: f64) -> Result<(), ConfigError> {
        self.entity
            .setup([position.x, position.y, velocity.x, velocity.y], time)
    }

    #[must_use]
    pub fn position(&self) -> DVec2 {
        state::vec2_at(self.entity.state(), 0)
    }

    #[must_use]
    pub fn velocity(&self) -> DVec2 {
        state::vec2_at(self.entity.state(), 2)
    }

    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[must_use]
    pub fn entity(&self) -> &Entity<Gravitation, 4> {
        &self.entity
    }
}

impl Member for HeavenlyBody {
    type Snapshot = Attractor;

    fn snapshot(&self) -> Attractor {
        Attractor {
            position: self.position(),
            mass: self.mass,
        }
    }

    fn step(&mut self, dt: f64, world: &World<'_, Attractor>) -> Result<StepReport, StepError> {
        let others: Vec<Attractor> = world.others().map(|(_, attractor)| *attractor).collect();
        self.entity.step(dt, &others)
    }
}

/// A system of mutually gravitating bodies.
pub type Universe = System<HeavenlyBody>;

/// Builds the Earth–Moon system.
///
/// Earth starts at rest at the origin and the Moon at `(d, 0)` moving at
/// `(0, 1000)` m/s.
///
/// # Errors
///
/// Returns an error only if the built-in constants are invalid.
pub fn earth_moon() -> Result<Universe, ConfigError> {
    let mut earth = HeavenlyBody::from_si(EARTH_MASS)?;
    earth.setup(DVec2::ZERO, DVec2::ZERO, 0.0)?;

    let mut moon = HeavenlyBody::from_si(MOON_MASS)?;
    moon.setup(
        DVec2::new(EARTH_MOON_DISTANCE, 0.0),
        DVec2::new(0.0, MOON_SPEED),
        0.0,
    )?;

    let mut universe = Universe::new(EARTH_MOON_DT)?;
    universe.add_entity("earth", earth);
    universe.add_entity("moon", moon);
    Ok(universe)
}

/// Returns the distance between two named bodies.
#[must_use]
pub fn separation(universe: &Universe, a: &str, b: &str) -> Option<f64> {
    let a = universe.get(a)?;
    let b = universe.get(b)?;
    Some(a.position().distance(b.position()))
}

/// Returns the total mechanical energy of the universe.
///
/// Kinetic energy of every body plus the pairwise potential `−G·mᵢ·mⱼ/r`,
/// using the constant of the first body of each pair.
#[must_use]
pub fn total_energy(universe: &Universe) -> f64 {
    let bodies: Vec<&HeavenlyBody> = universe.iter().map(|(_, body)| body).collect();

    let kinetic: f64 = bodies
        .iter()
        .map(|body| 0.5 * body.mass() * body.velocity().length_squared())
        .sum();

    let mut potential = 0.0;
    for (i, a) in bodies.iter().enumerate() {
        for b in &bodies[i + 1..] {
            let constant = a.entity().dynamics().constant();
            potential -= constant * a.mass() * b.mass() / a.position().distance(b.position());
        }
    }

    kinetic + potential
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn two_body_acceleration() {
        let gravitation = Gravitation::from_si(1.0).unwrap();
        let other = Attractor {
            position: DVec2::new(3.0, 4.0),
            mass: 50.0,
        };

        let rate = gravitation
            .derivative(0.0, &[0.0, 0.0, 1.0, 2.0], &[other])
            .unwrap();

        // |a| = G·m/r² = 50/25 = 2 along (3, 4)/5.
        assert_eq!(&rate[..2], &[1.0, 2.0]);
        assert_relative_eq!(rate[2], 1.2, epsilon = 1e-12);
        assert_relative_eq!(rate[3], 1.6, epsilon = 1e-12);
    }

    #[test]
    fn pulls_from_every_attractor_add_up() {
        let gravitation = Gravitation::from_si(1.0).unwrap();
        let left = Attractor {
            position: DVec2::new(-2.0, 0.0),
            mass: 4.0,
        };
        let right = Attractor {
            position: DVec2::new(2.0, 0.0),
            mass: 4.0,
        };

        let rate = gravitation
            .derivative(0.0, &[0.0; 4], &[left, right])
            .unwrap();

        assert_eq!(rate, [0.0; 4]);
    }

    #[test]
    fn coincident_bodies_are_singular() {
        let other = Attractor {
            position: DVec2::new(1.0, 1.0),
            mass: 1.0,
        };

        let result = Gravitation::default().derivative(0.0, &[1.0, 1.0, 0.0, 0.0], &[other]);

        assert_eq!(result, Err(SingularGeometry::CoincidentBodies));
    }

    #[test]
    fn earth_moon_scenario() {
        let universe = earth_moon().unwrap();

        assert_eq!(universe.len(), 2);
        assert_eq!(universe.dt(), 10.0);
        assert_relative_eq!(
            separation(&universe, "earth", "moon").unwrap(),
            EARTH_MOON_DISTANCE
        );
        assert!(separation(&universe, "earth", "mars").is_none());

        let expected = 0.5 * MOON_MASS * MOON_SPEED * MOON_SPEED
            - G * EARTH_MASS * MOON_MASS / EARTH_MOON_DISTANCE;
        assert_relative_eq!(total_energy(&universe), expected, max_relative = 1e-12);
    }

    #[test]
    fn rejects_non_positive_mass() {
        assert!(matches!(
            HeavenlyBody::from_si(0.0),
            Err(ConfigError::NonPositive("mass"))
        ));
    }
}

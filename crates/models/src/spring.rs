//! Point masses joined by damped springs.
//!
//! State layout per node: `[x, y, vx, vy]`.
//!
//! Each node has up to two spring slots. A slot is empty, anchored at a
//! fixed point, or linked to another node whose position is read from the
//! tick's snapshot.

use glam::{DVec2, DVec3};
use kinetic_core::{Dynamics, SingularGeometry, state};
use kinetic_solvers::transient::rkf78::Config;
use uom::si::{
    acceleration::meter_per_second_squared,
    f64::{Acceleration, Length, Mass},
    length::meter,
    mass::kilogram,
};

use crate::{
    ConfigError, Entity, StepError, StepReport, System,
    error::{finite, non_negative, positive},
    system::{Member, World},
    units::{Damping, Stiffness, damping_si, stiffness_si},
};

/// The far end of a spring.
#[derive(Debug, Clone, PartialEq)]
pub enum SpringAnchor {
    /// A point fixed in the world.
    Fixed(DVec2),

    /// Another node of the same network, by name.
    Linked(String),
}

/// Physical parameters of a spring node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub mass: Mass,
    pub stiffness: Stiffness,
    pub damping: Damping,
    pub gravity: Acceleration,
    pub rest_length: Length,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            mass: Mass::new::<kilogram>(1.0),
            stiffness: stiffness_si(10.0),
            damping: damping_si(0.2),
            gravity: Acceleration::new::<meter_per_second_squared>(9.8),
            rest_length: Length::new::<meter>(10.0),
        }
    }
}

impl Parameters {
    /// Sets mass in SI units (kg).
    #[must_use]
    pub fn mass_si(mut self, mass: f64) -> Self {
        self.mass = Mass::new::<kilogram>(mass);
        self
    }

    /// Sets stiffness in SI units (N/m).
    #[must_use]
    pub fn stiffness_si(mut self, stiffness: f64) -> Self {
        self.stiffness = stiffness_si(stiffness);
        self
    }

    /// Sets damping in SI units (N·s/m).
    #[must_use]
    pub fn damping_si(mut self, damping: f64) -> Self {
        self.damping = damping_si(damping);
        self
    }

    /// Sets gravity in SI units (m/s²).
    #[must_use]
    pub fn gravity_si(mut self, gravity: f64) -> Self {
        self.gravity = Acceleration::new::<meter_per_second_squared>(gravity);
        self
    }

    /// Sets rest length in SI units (m).
    #[must_use]
    pub fn rest_length_si(mut self, rest_length: f64) -> Self {
        self.rest_length = Length::new::<meter>(rest_length);
        self
    }
}

/// Spring, damping, and gravity forces acting on one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    mass: f64,
    stiffness: f64,
    damping: f64,
    gravity: f64,
    rest_length: f64,
}

impl Spring {
    /// # Errors
    ///
    /// Returns an error if mass or rest length is not positive, if stiffness
    /// or damping is negative, or if any value is not finite.
    pub fn new(parameters: Parameters) -> Result<Self, ConfigError> {
        Ok(Self {
            mass: positive("mass", parameters.mass.value)?,
            stiffness: non_negative("stiffness", parameters.stiffness.value)?,
            damping: non_negative("damping", parameters.damping.value)?,
            gravity: finite("gravity", parameters.gravity.value)?,
            rest_length: positive("rest length", parameters.rest_length.value)?,
        })
    }

    #[must_use]
    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }

    /// Force exerted on a node at `position` by a spring to `anchor`.
    fn tension(&self, position: DVec2, anchor: DVec2) -> Result<DVec2, SingularGeometry> {
        let d = position - anchor;
        let length = d.length();
        if length == 0.0 {
            return Err(SingularGeometry::ZeroLengthSpring);
        }
        Ok(-self.stiffness * (length - self.rest_length) * d / length)
    }
}

impl Dynamics<4> for Spring {
    /// Resolved anchor positions; `None` contributes no force.
    type Neighbors = [Option<DVec2>; 2];
    type Error = SingularGeometry;

    fn derivative(
        &self,
        _time: f64,
        y: &[f64; 4],
        anchors: &[Option<DVec2>; 2],
    ) -> Result<[f64; 4], SingularGeometry> {
        let position = state::vec2_at(y, 0);
        let velocity = state::vec2_at(y, 2);

        let mut force = DVec2::new(0.0, -self.mass * self.gravity) - self.damping * velocity;
        for anchor in anchors.iter().flatten() {
            force += self.tension(position, *anchor)?;
        }

        let acceleration = force / self.mass;
        Ok([velocity.x, velocity.y, acceleration.x, acceleration.y])
    }

    fn position(&self, y: &[f64; 4]) -> DVec3 {
        state::vec2_at(y, 0).extend(0.0)
    }
}

/// A node of a spring network.
#[derive(Debug, Clone)]
pub struct SpringNode {
    entity: Entity<Spring, 4>,
    anchors: [Option<SpringAnchor>; 2],
}

impl SpringNode {
    /// Creates a node with both spring slots empty.
    #[must_use]
    pub fn new(spring: Spring) -> Self {
        Self {
            entity: Entity::new(spring),
            anchors: [None, None],
        }
    }

    #[must_use]
    pub fn with_anchors(mut self, anchors: [Option<SpringAnchor>; 2]) -> Self {
        self.anchors = anchors;
        self
    }

    /// Replaces the integrator configuration.
    ///
    /// The node must be set up again afterwards.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.entity = self.entity.with_config(config);
        self
    }

    /// Places the node, discarding integrator history.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is not finite.
    pub fn setup(&mut self, position: DVec2, velocity: DVec2, time: f64) -> Result<(), ConfigError> {
        self.entity
            .setup([position.x, position.y, velocity.x, velocity.y], time)
    }

    #[must_use]
    pub fn anchors(&self) -> &[Option<SpringAnchor>; 2] {
        &self.anchors
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
    pub fn entity(&self) -> &Entity<Spring, 4> {
        &self.entity
    }

    /// Looks up the current position of each anchor.
    fn resolve(&self, world: &World<'_, DVec2>) -> Result<[Option<DVec2>; 2], StepError> {
        let mut resolved = [None; 2];
        for (slot, anchor) in resolved.iter_mut().zip(&self.anchors) {
            *slot = match anchor {
                None => None,
                Some(SpringAnchor::Fixed(point)) => Some(*point),
                Some(SpringAnchor::Linked(name)) => Some(*world.require(name)?),
            };
        }
        Ok(resolved)
    }
}

impl Member for SpringNode {
    type Snapshot = DVec2;

    fn snapshot(&self) -> DVec2 {
        self.position()
    }

    fn step(&mut self, dt: f64, world: &World<'_, DVec2>) -> Result<StepReport, StepError> {
        let anchors = self.resolve(world)?;
        self.entity.step(dt, &anchors)
    }
}

/// A network of spring-coupled nodes.
pub type SpringNetwork = System<SpringNode>;

/// Checks that every linked anchor names a node of the network.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownLink`] for the first dangling link.
pub fn validate_links(network: &SpringNetwork) -> Result<(), ConfigError> {
    for (node, spring_node) in network.iter() {
        for anchor in spring_node.anchors().iter().flatten() {
            if let SpringAnchor::Linked(target) = anchor {
                if network.get(target).is_none() {
                    return Err(ConfigError::UnknownLink {
                        node: node.to_owned(),
                        target: target.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

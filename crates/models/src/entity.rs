use glam::DVec3;
use kinetic_core::{CollisionPolicy, Correction, Dynamics, state};
use kinetic_solvers::transient::rkf78::{Config, Integrator, Outcome};
use tracing::{debug, info};

use crate::{ConfigError, StepError};

/// Stops an entity once one state coordinate reaches a level.
///
/// The entity terminates when `state[index] <= level` after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Floor {
    pub index: usize,
    pub level: f64,
}

impl Floor {
    fn is_reached(&self, state: &[f64]) -> bool {
        state.get(self.index).is_some_and(|value| *value <= self.level)
    }
}

/// Whether a step ended in free flight or was corrected by the collision policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Free,
    Corrected,
}

/// The result of stepping an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepReport {
    /// The entity advanced to `time`.
    Advanced { time: f64, contact: Contact },

    /// An earlier integration failure left the entity unchanged at `time`.
    Stalled { time: f64 },

    /// The entity has reached its termination floor and no longer moves.
    Terminated { time: f64 },
}

impl StepReport {
    /// Returns the entity time after the step.
    #[must_use]
    pub fn time(&self) -> f64 {
        match self {
            Self::Advanced { time, .. } | Self::Stalled { time } | Self::Terminated { time } => {
                *time
            }
        }
    }
}

/// A physical entity: dynamics, an owned integrator, and a collision policy.
///
/// The entity exclusively owns its state through its integrator. The visible
/// state is only ever replaced by a successful advance, optionally followed
/// by a collision correction, so a boundary violation is never observable.
#[derive(Debug, Clone)]
pub struct Entity<D, const N: usize, P = ()> {
    dynamics: D,
    policy: P,
    floor: Option<Floor>,
    integrator: Integrator<N>,
    ready: bool,
    terminated: bool,
}

impl<D: Dynamics<N>, const N: usize> Entity<D, N> {
    /// Creates an entity with no collision policy.
    ///
    /// The entity must be [set up](Self::setup) before stepping.
    #[must_use]
    pub fn new(dynamics: D) -> Self {
        Self {
            dynamics,
            policy: (),
            floor: None,
            integrator: Integrator::default(),
            ready: false,
            terminated: false,
        }
    }
}

impl<D: Dynamics<N>, const N: usize, P: CollisionPolicy<N>> Entity<D, N, P> {
    /// Attaches a collision policy, replacing any existing one.
    #[must_use]
    pub fn with_policy<Q: CollisionPolicy<N>>(self, policy: Q) -> Entity<D, N, Q> {
        Entity {
            dynamics: self.dynamics,
            policy,
            floor: self.floor,
            integrator: self.integrator,
            ready: self.ready,
            terminated: self.terminated,
        }
    }

    /// Uses a new integrator configuration.
    ///
    /// Replaces the integrator, so the entity must be set up again.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.integrator = Integrator::new(config);
        self.ready = false;
        self
    }

    /// Terminates the entity once it reaches `floor`.
    #[must_use]
    pub fn terminate_below(mut self, floor: Floor) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Binds the initial state and time, discarding any integrator history.
    ///
    /// # Errors
    ///
    /// Returns an error if any state element or the time is not finite.
    pub fn setup(&mut self, initial: [f64; N], time: f64) -> Result<(), ConfigError> {
        if !state::is_finite(&initial) || !time.is_finite() {
            return Err(ConfigError::NonFiniteState);
        }

        self.integrator.set_initial_value(initial, time);
        self.ready = true;
        self.terminated = false;
        info!(time, "entity set up");
        Ok(())
    }

    /// Binds an initial state supplied as a slice.
    ///
    /// # Errors
    ///
    /// Returns an error if `initial` does not have exactly `N` elements or is
    /// not finite.
    pub fn setup_from_slice(&mut self, initial: &[f64], time: f64) -> Result<(), ConfigError> {
        let initial = state::from_slice(initial)?;
        self.setup(initial, time)
    }

    /// Advances the entity by `dt`, applying the collision policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity has not been set up or integration fails.
    /// A failed step leaves the state unchanged, and later steps report
    /// [`StepReport::Stalled`] until the entity is set up again.
    pub fn step(&mut self, dt: f64, neighbors: &D::Neighbors) -> Result<StepReport, StepError> {
        if !self.ready {
            return Err(StepError::NotSetUp);
        }
        if self.terminated {
            return Ok(StepReport::Terminated { time: self.time() });
        }

        if self.integrator.advance(&self.dynamics, neighbors, dt)? == Outcome::Stalled {
            return Ok(StepReport::Stalled { time: self.time() });
        }

        let contact = if self.policy.is_collision(self.integrator.state()) {
            let Correction { state, time } =
                self.policy.respond(self.integrator.state(), self.integrator.time());
            debug!(time, "collision corrected");
            self.integrator.set_initial_value(state, time);
            Contact::Corrected
        } else {
            Contact::Free
        };

        let time = self.time();
        if self.floor.is_some_and(|floor| floor.is_reached(self.state())) {
            self.terminated = true;
            info!(time, "entity reached its termination floor");
            return Ok(StepReport::Terminated { time });
        }

        Ok(StepReport::Advanced { time, contact })
    }

    #[must_use]
    pub fn state(&self) -> &[f64; N] {
        self.integrator.state()
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.integrator.time()
    }

    /// Returns the world-frame position of the current state.
    #[must_use]
    pub fn position(&self) -> DVec3 {
        self.dynamics.position(self.state())
    }

    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.integrator.is_successful()
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub fn dynamics(&self) -> &D {
        &self.dynamics
    }

    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns the total number of derivative evaluations so far.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.integrator.evaluations()
    }
}

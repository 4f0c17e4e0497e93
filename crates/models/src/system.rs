//! Named collections of entities advanced together.
//!
//! # Two-phase tick
//!
//! Coupled entities read each other's state while integrating. To keep the
//! result independent of iteration order, every tick runs in two phases:
//!
//! 1. **Snapshot**: every member publishes an immutable snapshot
//!    (position, mass, ...) into a shared [`World`].
//! 2. **Integrate**: every member advances by `dt`, reading neighbors only
//!    from that frozen world, never from partially updated members.
//!
//! A failure in one member is logged and reported in the [`Tick`], and
//! never prevents the other members from stepping.
//!
//! # Observer Events
//!
//! [`System::run`] emits one [`Event`] after each tick. Observers can return
//! [`Action::StopEarly`] to end the run.

mod action;
mod event;
mod solution;

pub use action::Action;
pub use event::Event;
pub use solution::{Solution, Status};

use std::collections::BTreeMap;

use glam::DVec3;
use kinetic_core::{CollisionPolicy, Dynamics, Observer};
use tracing::warn;

use crate::{ConfigError, Entity, StepError, StepReport, error::positive};

/// An entity that can take part in a [`System`].
pub trait Member {
    /// What other members may read about this one during a tick.
    type Snapshot;

    /// Captures the state visible to other members.
    fn snapshot(&self) -> Self::Snapshot;

    /// Advances by `dt`, reading other members only through `world`.
    ///
    /// # Errors
    ///
    /// Returns an error if the member cannot advance.
    fn step(&mut self, dt: f64, world: &World<'_, Self::Snapshot>) -> Result<StepReport, StepError>;
}

/// Entities whose dynamics need no neighbors are members as-is.
impl<D, const N: usize, P> Member for Entity<D, N, P>
where
    D: Dynamics<N, Neighbors = ()>,
    P: CollisionPolicy<N>,
{
    type Snapshot = DVec3;

    fn snapshot(&self) -> DVec3 {
        self.position()
    }

    fn step(&mut self, dt: f64, _world: &World<'_, DVec3>) -> Result<StepReport, StepError> {
        Entity::step(self, dt, &())
    }
}

/// The frozen snapshots of a tick, as seen by one member.
#[derive(Debug)]
pub struct World<'a, S> {
    name: &'a str,
    snapshots: &'a BTreeMap<String, S>,
}

impl<'a, S> World<'a, S> {
    /// Creates the view of `snapshots` for the member called `name`.
    #[must_use]
    pub fn new(name: &'a str, snapshots: &'a BTreeMap<String, S>) -> Self {
        Self { name, snapshots }
    }

    /// Returns the name of the member this view belongs to.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the snapshot of the named member.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a S> {
        self.snapshots.get(name)
    }

    /// Returns the snapshot of the named member, or an error naming it.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::UnknownNeighbor`] if no member has that name.
    pub fn require(&self, name: &str) -> Result<&'a S, StepError> {
        self.get(name).ok_or_else(|| StepError::UnknownNeighbor {
            name: name.to_owned(),
        })
    }

    /// Iterates over every member except the viewing one.
    pub fn others(&self) -> impl Iterator<Item = (&'a str, &'a S)> {
        let own = self.name;
        self.snapshots
            .iter()
            .filter(move |(name, _)| name.as_str() != own)
            .map(|(name, snapshot)| (name.as_str(), snapshot))
    }
}

/// Per-member results of one tick.
#[derive(Debug)]
pub struct Tick {
    results: BTreeMap<String, Result<StepReport, StepError>>,
}

impl Tick {
    /// Returns the result for the named member.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Result<StepReport, StepError>> {
        self.results.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Result<StepReport, StepError>)> {
        self.results.iter().map(|(name, result)| (name.as_str(), result))
    }

    /// Iterates over the members that failed to step.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &StepError)> {
        self.iter()
            .filter_map(|(name, result)| result.as_ref().err().map(|err| (name, err)))
    }

    /// Returns `true` if every member stepped without error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.results.values().all(Result::is_ok)
    }
}

/// A set of uniquely named members sharing one clock.
#[derive(Debug, Clone)]
pub struct System<M> {
    members: BTreeMap<String, M>,
    dt: f64,
    elapsed: f64,
}

impl<M: Member> System<M> {
    /// Creates an empty system with a default time step.
    ///
    /// # Errors
    ///
    /// Returns an error if `dt` is not finite and positive.
    pub fn new(dt: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            members: BTreeMap::new(),
            dt: positive("time step", dt)?,
            elapsed: 0.0,
        })
    }

    /// Adds a member, returning the one it replaced under the same name.
    pub fn add_entity(&mut self, name: impl Into<String>, member: M) -> Option<M> {
        self.members.insert(name.into(), member)
    }

    pub fn remove(&mut self, name: &str) -> Option<M> {
        self.members.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&M> {
        self.members.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut M> {
        self.members.get_mut(name)
    }

    /// Iterates over members in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &M)> {
        self.members.iter().map(|(name, member)| (name.as_str(), member))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the default time step used by [`tick`](Self::tick).
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Returns the total time advanced by all ticks so far.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Captures the current snapshot of every member.
    #[must_use]
    pub fn snapshots(&self) -> BTreeMap<String, M::Snapshot> {
        self.members
            .iter()
            .map(|(name, member)| (name.clone(), member.snapshot()))
            .collect()
    }

    /// Advances every member once by the default time step.
    pub fn tick(&mut self) -> Tick {
        self.advance(self.dt)
    }

    /// Advances every member once by `dt` using the two-phase protocol.
    ///
    /// # Errors
    ///
    /// Returns an error if `dt` is not finite and positive. No member is
    /// stepped and the elapsed time is left untouched.
    pub fn tick_by(&mut self, dt: f64) -> Result<Tick, ConfigError> {
        let dt = positive("time step", dt)?;
        Ok(self.advance(dt))
    }

    fn advance(&mut self, dt: f64) -> Tick {
        let snapshots = self.snapshots();

        let results = self
            .members
            .iter_mut()
            .map(|(name, member)| {
                let result = member.step(dt, &World::new(name, &snapshots));
                if let Err(err) = &result {
                    warn!(member = %name, %err, "member failed to step");
                }
                (name.clone(), result)
            })
            .collect();

        self.elapsed += dt;
        Tick { results }
    }

    /// Runs `ticks` ticks, emitting an [`Event`] to the observer after each.
    pub fn run<O>(&mut self, ticks: usize, mut observer: O) -> Solution
    where
        O: for<'a> Observer<Event<'a, M>, Action>,
    {
        for tick in 1..=ticks {
            let report = self.tick();
            let event = Event {
                tick,
                system: &*self,
                report: &report,
            };

            if let Some(Action::StopEarly) = observer.observe(&event) {
                return Solution {
                    status: Status::StoppedByObserver,
                    ticks: tick,
                };
            }
        }

        Solution {
            status: Status::Complete,
            ticks,
        }
    }

    /// Runs `ticks` ticks without observation.
    pub fn run_unobserved(&mut self, ticks: usize) -> Solution {
        self.run(ticks, ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::fall::Fall;

    /// A member that records how many others it saw and their sum.
    #[derive(Debug, Default)]
    struct Counter {
        value: f64,
        seen: Vec<f64>,
    }

    impl Member for Counter {
        type Snapshot = f64;

        fn snapshot(&self) -> f64 {
            self.value
        }

        fn step(&mut self, _dt: f64, world: &World<'_, f64>) -> Result<StepReport, StepError> {
            self.seen = world.others().map(|(_, value)| *value).collect();
            self.value += 1.0;
            Ok(StepReport::Advanced {
                time: 0.0,
                contact: crate::Contact::Free,
            })
        }
    }

    fn counter(value: f64) -> Counter {
        Counter {
            value,
            seen: Vec::new(),
        }
    }

    #[test]
    fn rejects_bad_time_step() {
        assert!(matches!(
            System::<Counter>::new(0.0),
            Err(ConfigError::NonPositive("time step"))
        ));
        assert!(matches!(
            System::<Counter>::new(f64::NAN),
            Err(ConfigError::NonFinite("time step"))
        ));
    }

    #[test]
    fn members_see_only_the_frozen_snapshot() {
        let mut system = System::new(1.0).unwrap();
        system.add_entity("a", counter(10.0));
        system.add_entity("b", counter(20.0));
        system.add_entity("c", counter(30.0));

        let tick = system.tick();
        assert!(tick.is_clean());

        // Every member saw pre-tick values, whatever its position in the order.
        assert_eq!(system.get("a").unwrap().seen, vec![20.0, 30.0]);
        assert_eq!(system.get("b").unwrap().seen, vec![10.0, 30.0]);
        assert_eq!(system.get("c").unwrap().seen, vec![10.0, 20.0]);
    }

    #[test]
    fn adding_under_an_existing_name_replaces() {
        let mut system = System::new(1.0).unwrap();
        assert!(system.add_entity("a", counter(1.0)).is_none());

        let replaced = system.add_entity("a", counter(2.0)).unwrap();

        assert_eq!(replaced.value, 1.0);
        assert_eq!(system.len(), 1);
        assert_eq!(system.get("a").unwrap().value, 2.0);
    }

    #[test]
    fn failures_are_isolated() {
        let mut system = System::new(0.1).unwrap();

        let mut ready = Entity::new(Fall::from_si(9.8).unwrap());
        ready.setup([10.0, 0.0], 0.0).unwrap();
        system.add_entity("ready", ready);
        system.add_entity("unset", Entity::new(Fall::from_si(9.8).unwrap()));

        let tick = system.tick();

        assert!(!tick.is_clean());
        let failures: Vec<_> = tick.failures().map(|(name, _)| name).collect();
        assert_eq!(failures, vec!["unset"]);
        assert!(matches!(tick.get("ready"), Some(Ok(StepReport::Advanced { .. }))));
        assert_relative_eq!(system.get("ready").unwrap().time(), 0.1);
    }

    #[test]
    fn run_completes_or_stops_early() {
        let mut system = System::new(0.5).unwrap();
        system.add_entity("a", counter(0.0));

        let solution = system.run_unobserved(4);
        assert_eq!(solution.status, Status::Complete);
        assert_eq!(solution.ticks, 4);
        assert_relative_eq!(system.elapsed(), 2.0);

        let observer = |event: &Event<'_, Counter>| {
            if event.system.get("a").is_some_and(|a| a.value >= 6.0) {
                Some(Action::StopEarly)
            } else {
                None
            }
        };
        let solution = system.run(100, observer);

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.ticks, 2);
        assert_eq!(system.get("a").unwrap().value, 6.0);
    }

    #[test]
    fn bad_tick_step_leaves_the_clock_alone() {
        let mut system = System::new(0.1).unwrap();
        let mut ball = Entity::new(Fall::from_si(9.8).unwrap());
        ball.setup([10.0, 0.0], 0.0).unwrap();
        system.add_entity("ball", ball);

        for dt in [f64::NAN, -0.1, 0.0, f64::INFINITY] {
            assert!(system.tick_by(dt).is_err());
        }
        assert_eq!(system.elapsed(), 0.0);
        assert_eq!(system.get("ball").unwrap().time(), 0.0);

        assert!(system.tick().is_clean());
        assert!(system.tick_by(0.2).unwrap().is_clean());
        assert_relative_eq!(system.elapsed(), 0.3);
        assert_relative_eq!(system.get("ball").unwrap().time(), system.elapsed());
    }

    #[test]
    fn world_lookup() {
        let snapshots = BTreeMap::from([("a".to_owned(), 1.0), ("b".to_owned(), 2.0)]);
        let world = World::new("a", &snapshots);

        assert_eq!(world.name(), "a");
        assert_eq!(world.get("b"), Some(&2.0));
        assert!(matches!(
            world.require("z"),
            Err(StepError::UnknownNeighbor { name }) if name == "z"
        ));
        assert_eq!(world.others().collect::<Vec<_>>(), vec![("b", &2.0)]);
    }
}

use std::{convert::Infallible, f64::consts::PI};

use approx::{assert_abs_diff_eq, assert_relative_eq};
use glam::DVec3;
use kinetic_core::Dynamics;
use thiserror::Error;

use super::{Config, Error, Integrator, Outcome, Status};

/// Uniform gravity acting on `[y, vy]`.
struct FreeFall {
    gravity: f64,
}

impl Dynamics<2> for FreeFall {
    type Neighbors = ();
    type Error = Infallible;

    fn derivative(&self, _t: f64, y: &[f64; 2], _: &()) -> Result<[f64; 2], Infallible> {
        Ok([y[1], -self.gravity])
    }

    fn position(&self, y: &[f64; 2]) -> DVec3 {
        DVec3::new(0.0, y[0], 0.0)
    }
}

/// Unit-frequency harmonic oscillator on `[x, v]`.
struct Oscillator;

impl Dynamics<2> for Oscillator {
    type Neighbors = ();
    type Error = Infallible;

    fn derivative(&self, _t: f64, y: &[f64; 2], _: &()) -> Result<[f64; 2], Infallible> {
        Ok([y[1], -y[0]])
    }

    fn position(&self, y: &[f64; 2]) -> DVec3 {
        DVec3::new(y[0], 0.0, 0.0)
    }
}

/// Relaxes toward a target supplied as the neighbor value.
struct Relax;

impl Dynamics<1> for Relax {
    type Neighbors = f64;
    type Error = Infallible;

    fn derivative(&self, _t: f64, y: &[f64; 1], target: &f64) -> Result<[f64; 1], Infallible> {
        Ok([target - y[0]])
    }

    fn position(&self, y: &[f64; 1]) -> DVec3 {
        DVec3::new(y[0], 0.0, 0.0)
    }
}

#[derive(Debug, Error)]
#[error("left the valid region")]
struct OutOfBounds;

/// Constant drift that refuses to evaluate below `floor`.
struct Bounded {
    floor: f64,
}

impl Dynamics<1> for Bounded {
    type Neighbors = ();
    type Error = OutOfBounds;

    fn derivative(&self, _t: f64, y: &[f64; 1], _: &()) -> Result<[f64; 1], OutOfBounds> {
        if y[0] < self.floor {
            Err(OutOfBounds)
        } else {
            Ok([-1.0])
        }
    }

    fn position(&self, y: &[f64; 1]) -> DVec3 {
        DVec3::new(y[0], 0.0, 0.0)
    }
}

/// `y' = y²` from `y(0) = 1`, which blows up at `t = 1`.
struct Blowup;

impl Dynamics<1> for Blowup {
    type Neighbors = ();
    type Error = Infallible;

    fn derivative(&self, _t: f64, y: &[f64; 1], _: &()) -> Result<[f64; 1], Infallible> {
        Ok([y[0] * y[0]])
    }

    fn position(&self, y: &[f64; 1]) -> DVec3 {
        DVec3::new(y[0], 0.0, 0.0)
    }
}

#[test]
fn free_fall_single_step() {
    let mut integrator = Integrator::default();
    integrator.set_initial_value([100.0, 0.0], 0.0);

    let outcome = integrator
        .advance(&FreeFall { gravity: 9.8 }, &(), 0.1)
        .unwrap();

    assert_eq!(outcome, Outcome::Advanced);
    assert_relative_eq!(integrator.state()[0], 100.0 - 0.049, epsilon = 1e-10);
    assert_relative_eq!(integrator.state()[1], -0.98, epsilon = 1e-12);
    assert_relative_eq!(integrator.time(), 0.1);

    // A quadratic trajectory is integrated exactly, so one trial suffices.
    assert_eq!(integrator.evaluations(), 13);
}

#[test]
fn oscillator_half_period() {
    let config = Config::new(1e-10, 1e-12, 10_000).unwrap();
    let mut integrator = Integrator::new(config);
    integrator.set_initial_value([1.0, 0.0], 0.0);

    integrator.advance(&Oscillator, &(), PI).unwrap();

    assert_relative_eq!(integrator.state()[0], -1.0, epsilon = 1e-8);
    assert_abs_diff_eq!(integrator.state()[1], 0.0, epsilon = 1e-8);
    assert_eq!(integrator.time(), PI);
}

#[test]
fn time_lands_exactly_on_each_request() {
    let mut integrator = Integrator::default();
    integrator.set_initial_value([1.0, 0.0], 2.5);

    let mut expected = 2.5;
    for _ in 0..25 {
        integrator.advance(&Oscillator, &(), 0.33).unwrap();
        expected += 0.33;
        assert_eq!(integrator.time(), expected);
    }
}

#[test]
fn neighbors_are_passed_to_every_evaluation() {
    let mut integrator = Integrator::new(Config::new(1e-10, 1e-12, 10_000).unwrap());
    integrator.set_initial_value([0.0], 0.0);

    integrator.advance(&Relax, &2.0, 1.0).unwrap();

    let expected = 2.0 * (1.0 - (-1.0_f64).exp());
    assert_relative_eq!(integrator.state()[0], expected, epsilon = 1e-9);
}

#[test]
fn reinitialization_discards_history() {
    // Approaching the singularity at t = 1 leaves a step hint far below 1.
    let mut used = Integrator::default();
    used.set_initial_value([1.0], 0.0);
    used.advance(&Blowup, &(), 0.9).unwrap();
    assert_relative_eq!(used.state()[0], 10.0, max_relative = 1e-3);

    // Near zero the same problem is easy enough for a single sub-step.
    let mut fresh = Integrator::default();
    used.set_initial_value([1e-3], 0.0);
    fresh.set_initial_value([1e-3], 0.0);

    let before = used.evaluations();
    used.advance(&Blowup, &(), 1.0).unwrap();
    fresh.advance(&Blowup, &(), 1.0).unwrap();

    assert_eq!(fresh.evaluations(), 13);
    assert_eq!(used.evaluations() - before, fresh.evaluations());
    assert_eq!(used.state(), fresh.state());
    assert_eq!(used.time(), fresh.time());
}

#[test]
fn failure_latches_until_reinitialized() {
    let dynamics = Bounded { floor: 0.0 };
    let mut integrator = Integrator::default();
    integrator.set_initial_value([0.5], 0.0);

    integrator.advance(&dynamics, &(), 0.25).unwrap();
    assert_relative_eq!(integrator.state()[0], 0.25, epsilon = 1e-12);

    // Crossing the floor mid-step fails the whole advance.
    let err = integrator.advance(&dynamics, &(), 1.0).unwrap_err();
    assert!(matches!(err, Error::Dynamics(_)));
    assert_eq!(err.to_string(), "dynamics error: left the valid region");
    assert_eq!(integrator.status(), Status::Unsuccessful);
    assert_relative_eq!(integrator.state()[0], 0.25, epsilon = 1e-12);
    assert_relative_eq!(integrator.time(), 0.25);

    // Later calls are no-ops, even ones that would succeed.
    let outcome = integrator.advance(&dynamics, &(), 0.1).unwrap();
    assert_eq!(outcome, Outcome::Stalled);
    assert_relative_eq!(integrator.time(), 0.25);

    integrator.set_initial_value([0.25], 0.25);
    assert!(integrator.is_successful());
    assert_eq!(
        integrator.advance(&dynamics, &(), 0.1).unwrap(),
        Outcome::Advanced
    );
}

#[test]
fn invalid_state_fails_on_first_evaluation() {
    let mut integrator = Integrator::default();
    integrator.set_initial_value([-1.0], 0.0);

    let err = integrator
        .advance(&Bounded { floor: 0.0 }, &(), 0.1)
        .unwrap_err();

    assert!(matches!(err, Error::Dynamics(_)));
    assert_eq!(integrator.evaluations(), 1);
}

#[test]
fn invalid_step_does_not_latch() {
    let mut integrator = Integrator::default();
    integrator.set_initial_value([1.0, 0.0], 0.0);

    for dt in [0.0, -0.1, f64::NAN, f64::INFINITY] {
        let err = integrator.advance(&Oscillator, &(), dt).unwrap_err();
        assert!(matches!(err, Error::InvalidStep { .. }));
    }

    assert!(integrator.is_successful());
    assert_eq!(integrator.evaluations(), 0);
}

#[test]
fn finite_time_blowup_is_reported() {
    let mut integrator = Integrator::default();
    integrator.set_initial_value([1.0], 0.0);

    let err = integrator.advance(&Blowup, &(), 2.0).unwrap_err();

    assert!(matches!(
        err,
        Error::StepSizeTooSmall { .. } | Error::NonFinite { .. } | Error::TooManySteps { .. }
    ));
    assert_eq!(integrator.status(), Status::Unsuccessful);
    assert_eq!(integrator.state(), &[1.0]);
    assert_eq!(integrator.time(), 0.0);
}

#[test]
fn step_limit_is_enforced() {
    let config = Config::new(1e-12, 1e-14, 3).unwrap();
    let mut integrator = Integrator::new(config);
    integrator.set_initial_value([1.0, 0.0], 0.0);

    let err = integrator.advance(&Oscillator, &(), 100.0).unwrap_err();

    assert!(matches!(err, Error::TooManySteps { limit: 3, .. }));
}

use kinetic_core::Observer;
use kinetic_models::{
    gravitation::{self, HeavenlyBody},
    system::Event,
};

use crate::traits::{CanStopEarly, HasElapsed, HasFailures};

/// Tracks the distance between two bodies of a universe.
///
/// Every tick the monitor samples the separation and keeps the closest and
/// farthest approach seen so far. With [`within`](Self::within) it also stops
/// the run as soon as the separation leaves the given band, which is how an
/// unstable orbit shows up.
#[derive(Debug, Clone)]
pub struct SeparationMonitor {
    first: String,
    second: String,
    band: Option<(f64, f64)>,
    closest: Option<(f64, f64)>,
    farthest: Option<(f64, f64)>,
    breach: Option<(f64, f64)>,
    samples: usize,
}

impl SeparationMonitor {
    /// Monitors the bodies named `first` and `second`.
    #[must_use]
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            band: None,
            closest: None,
            farthest: None,
            breach: None,
            samples: 0,
        }
    }

    /// Stops the run once the separation leaves `[min, max]`.
    #[must_use]
    pub fn within(mut self, min: f64, max: f64) -> Self {
        self.band = Some((min, max));
        self
    }

    /// Records one sample and returns `false` if it lies outside the band.
    pub fn sample(&mut self, time: f64, separation: f64) -> bool {
        self.samples += 1;

        if self.closest.is_none_or(|(_, d)| separation < d) {
            self.closest = Some((time, separation));
        }
        if self.farthest.is_none_or(|(_, d)| separation > d) {
            self.farthest = Some((time, separation));
        }

        let inside = self
            .band
            .is_none_or(|(min, max)| (min..=max).contains(&separation));
        if !inside && self.breach.is_none() {
            self.breach = Some((time, separation));
        }
        inside
    }

    /// The `(time, separation)` of the closest approach.
    #[must_use]
    pub fn closest(&self) -> Option<(f64, f64)> {
        self.closest
    }

    /// The `(time, separation)` of the farthest approach.
    #[must_use]
    pub fn farthest(&self) -> Option<(f64, f64)> {
        self.farthest
    }

    /// The first sample that left the band, if any.
    #[must_use]
    pub fn breach(&self) -> Option<(f64, f64)> {
        self.breach
    }

    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Estimates the orbital eccentricity from the extreme separations.
    ///
    /// Only meaningful once a full orbit has been observed.
    #[must_use]
    pub fn eccentricity(&self) -> Option<f64> {
        let (_, near) = self.closest?;
        let (_, far) = self.farthest?;
        Some((far - near) / (far + near))
    }
}

impl<A: CanStopEarly> Observer<Event<'_, HeavenlyBody>, A> for SeparationMonitor {
    fn observe(&mut self, event: &Event<'_, HeavenlyBody>) -> Option<A> {
        let separation = gravitation::separation(event.system, &self.first, &self.second)?;
        if self.sample(event.elapsed(), separation) {
            None
        } else {
            Some(A::stop_early())
        }
    }
}

impl<A: CanStopEarly> Observer<Event<'_, HeavenlyBody>, A> for &mut SeparationMonitor {
    fn observe(&mut self, event: &Event<'_, HeavenlyBody>) -> Option<A> {
        (**self).observe(event)
    }
}

/// Stops a run at the first tick in which any member fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

impl<E: HasFailures, A: CanStopEarly> Observer<E, A> for FailFast {
    fn observe(&mut self, event: &E) -> Option<A> {
        (event.failure_count() > 0).then(A::stop_early)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use glam::DVec2;
    use kinetic_models::{
        gravitation::{EARTH_MOON_DISTANCE, Universe, earth_moon},
        system::Status,
    };

    #[test]
    fn tracks_extremes() {
        let mut monitor = SeparationMonitor::new("a", "b");
        for (t, d) in [(0.0, 5.0), (1.0, 3.0), (2.0, 7.0), (3.0, 4.0)] {
            assert!(monitor.sample(t, d));
        }

        assert_eq!(monitor.samples(), 4);
        assert_eq!(monitor.closest(), Some((1.0, 3.0)));
        assert_eq!(monitor.farthest(), Some((2.0, 7.0)));
        assert_relative_eq!(monitor.eccentricity().unwrap(), 0.4);
        assert_eq!(monitor.breach(), None);
    }

    #[test]
    fn earth_moon_stays_in_band() {
        let mut universe = earth_moon().unwrap();
        let mut monitor = SeparationMonitor::new("earth", "moon")
            .within(0.9 * EARTH_MOON_DISTANCE, 1.1 * EARTH_MOON_DISTANCE);

        let solution = universe.run(100, &mut monitor);

        assert_eq!(solution.status, Status::Complete);
        assert_eq!(monitor.samples(), 100);
        let (_, closest) = monitor.closest().unwrap();
        assert_relative_eq!(closest, EARTH_MOON_DISTANCE, max_relative = 1e-3);
    }

    #[test]
    fn leaving_the_band_stops_the_run() {
        let mut universe = earth_moon().unwrap();
        let mut monitor = SeparationMonitor::new("earth", "moon").within(0.0, 1.0);

        let solution = universe.run(100, &mut monitor);

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.ticks, 1);
        assert!(monitor.breach().is_some());
    }

    #[test]
    fn missing_body_is_ignored() {
        let mut universe = earth_moon().unwrap();
        let mut monitor = SeparationMonitor::new("earth", "mars").within(0.0, 1.0);

        let solution = universe.run(5, &mut monitor);

        assert_eq!(solution.status, Status::Complete);
        assert_eq!(monitor.samples(), 0);
    }

    #[test]
    fn fail_fast_stops_on_singular_geometry() {
        let body = || {
            let mut body = HeavenlyBody::from_si(1e20).unwrap();
            body.setup(DVec2::ZERO, DVec2::ZERO, 0.0).unwrap();
            body
        };
        let mut universe = Universe::new(1.0).unwrap();
        universe.add_entity("a", body());
        universe.add_entity("b", body());

        let solution = universe.run(10, FailFast);

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.ticks, 1);
    }
}

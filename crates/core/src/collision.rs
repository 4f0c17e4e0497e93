/// A corrected state and time that replaces a boundary-violating result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction<const N: usize> {
    pub state: [f64; N],
    pub time: f64,
}

/// A discrete-event detector and corrector layered on continuous integration.
///
/// After every accepted integration step the owning entity asks
/// [`is_collision`](Self::is_collision) about the freshly advanced state. When
/// it reports `true`, [`respond`](Self::respond) computes the corrected state
/// and time, the integrator is reinitialized from them, and only the corrected
/// values ever become visible to callers.
///
/// The unit type `()` is the "no collisions" policy.
pub trait CollisionPolicy<const N: usize> {
    /// Returns `true` if `state` lies on or past the boundary.
    fn is_collision(&self, state: &[f64; N]) -> bool;

    /// Computes the post-impact state and time.
    ///
    /// The returned state must not itself satisfy [`is_collision`](Self::is_collision).
    fn respond(&self, state: &[f64; N], time: f64) -> Correction<N>;
}

/// Implements [`CollisionPolicy`] as a policy that never detects anything.
impl<const N: usize> CollisionPolicy<N> for () {
    fn is_collision(&self, _state: &[f64; N]) -> bool {
        false
    }

    fn respond(&self, state: &[f64; N], time: f64) -> Correction<N> {
        Correction {
            state: *state,
            time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Wall;

    impl CollisionPolicy<2> for Wall {
        fn is_collision(&self, state: &[f64; 2]) -> bool {
            state[0] >= 1.0
        }

        fn respond(&self, state: &[f64; 2], time: f64) -> Correction<2> {
            Correction {
                state: [1.0 - (state[0] - 1.0), -state[1]],
                time,
            }
        }
    }

    #[test]
    fn unit_policy_never_collides() {
        let state = [-1e9, 0.0, 0.0];
        assert!(!().is_collision(&state));
        assert_eq!(
            ().respond(&state, 2.0),
            Correction { state, time: 2.0 }
        );
    }

    #[test]
    fn reflecting_wall() {
        let state = [1.25, 3.0];
        assert!(Wall.is_collision(&state));

        let corrected = Wall.respond(&state, 0.5);
        assert_eq!(corrected.state, [0.75, -3.0]);
        assert!(!Wall.is_collision(&corrected.state));
    }
}

use glam::DVec3;

/// Defines the rate of change of a fixed-length physical state vector.
///
/// A `Dynamics` value holds the immutable physical parameters of one entity
/// (mass, stiffness, gravity, ...) and maps `(time, state, neighbors)` to a
/// rate vector with exactly the same length and block layout as `state`.
/// The length invariant is carried by the const parameter `N`.
///
/// Implementations must be pure: the same inputs always produce the same
/// rate, and evaluating the derivative never mutates the entity. Anything an
/// entity needs to know about the rest of the system arrives through
/// `neighbors`, a read-only snapshot frozen for the duration of one tick.
pub trait Dynamics<const N: usize> {
    /// Read-only view of other entities consumed by each evaluation.
    ///
    /// Use `()` when the entity is not coupled to anything.
    type Neighbors: ?Sized;

    type Error: std::error::Error + Send + Sync + 'static;

    /// Computes the rate of change of `state` at `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the state is geometrically degenerate and
    /// the derivative is undefined.
    fn derivative(
        &self,
        time: f64,
        state: &[f64; N],
        neighbors: &Self::Neighbors,
    ) -> Result<[f64; N], Self::Error>;

    /// Extracts the world-frame position encoded in `state`.
    ///
    /// Planar models report `z = 0`.
    fn position(&self, state: &[f64; N]) -> DVec3;
}

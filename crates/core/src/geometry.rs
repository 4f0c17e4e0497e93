use thiserror::Error;

/// A derivative that would divide by a vanishing length.
///
/// These inputs have no physical answer, so evaluation fails with a named
/// error instead of silently producing `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SingularGeometry {
    /// Two gravitating bodies occupy the same point.
    #[error("gravitating bodies are coincident; direction of attraction is undefined")]
    CoincidentBodies,

    /// A spring's endpoints coincide.
    #[error("spring has zero length; direction of spring force is undefined")]
    ZeroLengthSpring,

    /// A rotation block has a zero or collinear row and cannot be orthonormalized.
    #[error("rotation matrix is degenerate and cannot be orthonormalized")]
    DegenerateRotation,
}

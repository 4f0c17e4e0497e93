//! Helpers for working with flat physical state vectors.
//!
//! A state is a `[f64; N]` whose meaning is fixed by the owning model's block
//! layout, e.g. `[x, y, vx, vy]` or `[position(3), rotation(9), momentum(3), ...]`.

use glam::{DVec2, DVec3};
use thiserror::Error;

/// A dynamically sized slice did not match the fixed state length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("state has {found} elements, expected {expected}")]
pub struct LengthMismatch {
    pub expected: usize,
    pub found: usize,
}

/// Copies `values` into a fixed-length state.
///
/// # Errors
///
/// Returns [`LengthMismatch`] if `values.len() != N`.
pub fn from_slice<const N: usize>(values: &[f64]) -> Result<[f64; N], LengthMismatch> {
    values.try_into().map_err(|_| LengthMismatch {
        expected: N,
        found: values.len(),
    })
}

/// Reads the two-vector stored at `state[offset..offset + 2]`.
///
/// # Panics
///
/// Panics if the block extends past the end of `state`.
#[must_use]
pub fn vec2_at(state: &[f64], offset: usize) -> DVec2 {
    DVec2::from_slice(&state[offset..offset + 2])
}

/// Reads the three-vector stored at `state[offset..offset + 3]`.
///
/// # Panics
///
/// Panics if the block extends past the end of `state`.
#[must_use]
pub fn vec3_at(state: &[f64], offset: usize) -> DVec3 {
    DVec3::from_slice(&state[offset..offset + 3])
}

/// Writes `value` into `state[offset..offset + 2]`.
pub fn put_vec2(state: &mut [f64], offset: usize, value: DVec2) {
    value.write_to_slice(&mut state[offset..offset + 2]);
}

/// Writes `value` into `state[offset..offset + 3]`.
pub fn put_vec3(state: &mut [f64], offset: usize, value: DVec3) {
    value.write_to_slice(&mut state[offset..offset + 3]);
}

/// Returns `true` if every element is finite.
#[must_use]
pub fn is_finite(state: &[f64]) -> bool {
    state.iter().all(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_checks_length() {
        let state: [f64; 3] = from_slice(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(state, [1.0, 2.0, 3.0]);

        let err = from_slice::<4>(&[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            LengthMismatch {
                expected: 4,
                found: 2
            }
        );
        assert_eq!(err.to_string(), "state has 2 elements, expected 4");
    }

    #[test]
    fn block_access() {
        let mut state = [0.0; 7];
        put_vec2(&mut state, 0, DVec2::new(1.0, 2.0));
        put_vec3(&mut state, 3, DVec3::new(4.0, 5.0, 6.0));

        assert_eq!(state, [1.0, 2.0, 0.0, 4.0, 5.0, 6.0, 0.0]);
        assert_eq!(vec2_at(&state, 0), DVec2::new(1.0, 2.0));
        assert_eq!(vec3_at(&state, 3), DVec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn finiteness() {
        assert!(is_finite(&[0.0, -1.0, 1e300]));
        assert!(!is_finite(&[0.0, f64::NAN]));
        assert!(!is_finite(&[f64::INFINITY]));
    }
}

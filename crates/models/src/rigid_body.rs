//! A single rigid body with gravity, damping, and an optional tether spring.
//!
//! State layout (19 elements):
//!
//! | Slots    | Contents                                   |
//! |----------|--------------------------------------------|
//! | `0..3`   | position of the center of mass             |
//! | `3..12`  | rotation matrix `R`, row-major             |
//! | `12..15` | linear momentum `P`                        |
//! | `15..18` | angular momentum `L`                       |
//! | `18`     | reserved, always zero rate                 |
//!
//! The rotation block drifts away from orthonormal as it is integrated, so it
//! is re-orthonormalized (Gram-Schmidt on rows) before every use.

use glam::{DMat3, DVec3};
use kinetic_core::{Dynamics, SingularGeometry, state};
use uom::si::{
    acceleration::meter_per_second_squared,
    f64::{Acceleration, Length, Mass},
    length::meter,
    mass::kilogram,
};

use crate::{
    ConfigError,
    error::{finite, non_negative, positive},
    units::{Damping, Stiffness, damping_si, stiffness_si},
};

pub const STATE_LEN: usize = 19;

const POSITION: usize = 0;
const ROTATION: usize = 3;
const MOMENTUM: usize = 12;
const ANGULAR_MOMENTUM: usize = 15;

/// A spring from a fixed world point to a point on the body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tether {
    /// World-frame anchor point.
    pub anchor: DVec3,
    /// Body-frame attachment point, relative to the center of mass.
    pub attachment: DVec3,
    pub stiffness: Stiffness,
    pub rest_length: Length,
}

impl Tether {
    /// Creates a tether from SI values (N/m and m).
    #[must_use]
    pub fn from_si(anchor: DVec3, attachment: DVec3, stiffness: f64, rest_length: f64) -> Self {
        Self {
            anchor,
            attachment,
            stiffness: stiffness_si(stiffness),
            rest_length: Length::new::<meter>(rest_length),
        }
    }
}

/// Physical parameters of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub mass: Mass,
    /// Body-frame inertia tensor in kg·m².
    pub inertia: DMat3,
    pub gravity: Acceleration,
    pub damping: Damping,
    pub tether: Option<Tether>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            mass: Mass::new::<kilogram>(1.0),
            inertia: DMat3::IDENTITY,
            gravity: Acceleration::new::<meter_per_second_squared>(9.81),
            damping: damping_si(0.0),
            tether: None,
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

    #[must_use]
    pub fn inertia(mut self, inertia: DMat3) -> Self {
        self.inertia = inertia;
        self
    }

    /// Sets gravity in SI units (m/s²).
    #[must_use]
    pub fn gravity_si(mut self, gravity: f64) -> Self {
        self.gravity = Acceleration::new::<meter_per_second_squared>(gravity);
        self
    }

    /// Sets damping in SI units (N·s/m).
    #[must_use]
    pub fn damping_si(mut self, damping: f64) -> Self {
        self.damping = damping_si(damping);
        self
    }

    #[must_use]
    pub fn tether(mut self, tether: Tether) -> Self {
        self.tether = Some(tether);
        self
    }
}

/// Inertia tensor of a solid cuboid about its center.
#[must_use]
pub fn cuboid_inertia(mass: f64, size: DVec3) -> DMat3 {
    let s = size * size;
    DMat3::from_diagonal(mass / 12.0 * DVec3::new(s.y + s.z, s.x + s.z, s.x + s.y))
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Spring {
    anchor: DVec3,
    attachment: DVec3,
    stiffness: f64,
    rest_length: f64,
}

/// Rigid-body dynamics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    mass: f64,
    inertia: DMat3,
    inertia_inv: DMat3,
    gravity: f64,
    damping: f64,
    spring: Option<Spring>,
}

impl RigidBody {
    /// # Errors
    ///
    /// Returns an error if mass is not positive, the inertia tensor is not
    /// invertible, damping is negative, or the tether is invalid.
    pub fn new(parameters: Parameters) -> Result<Self, ConfigError> {
        let inertia = parameters.inertia;
        if !inertia.is_finite() || inertia.determinant() == 0.0 {
            return Err(ConfigError::SingularInertia);
        }

        let spring = parameters
            .tether
            .map(|tether| {
                if !tether.anchor.is_finite() || !tether.attachment.is_finite() {
                    return Err(ConfigError::NonFinite("tether geometry"));
                }
                Ok(Spring {
                    anchor: tether.anchor,
                    attachment: tether.attachment,
                    stiffness: non_negative("stiffness", tether.stiffness.value)?,
                    rest_length: positive("rest length", tether.rest_length.value)?,
                })
            })
            .transpose()?;

        Ok(Self {
            mass: positive("mass", parameters.mass.value)?,
            inertia,
            inertia_inv: inertia.inverse(),
            gravity: finite("gravity", parameters.gravity.value)?,
            damping: non_negative("damping", parameters.damping.value)?,
            spring,
        })
    }

    /// Builds a state from a pose and world-frame velocities.
    #[must_use]
    pub fn initial_state(
        &self,
        position: DVec3,
        rotation: DMat3,
        velocity: DVec3,
        angular_velocity: DVec3,
    ) -> [f64; STATE_LEN] {
        let world_inertia = rotation * self.inertia * rotation.transpose();

        let mut y = [0.0; STATE_LEN];
        state::put_vec3(&mut y, POSITION, position);
        put_rotation(&mut y, rotation);
        state::put_vec3(&mut y, MOMENTUM, self.mass * velocity);
        state::put_vec3(&mut y, ANGULAR_MOMENTUM, world_inertia * angular_velocity);
        y
    }

    /// Returns the orthonormalized rotation encoded in `y`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rotation block is degenerate.
    pub fn orientation(&self, y: &[f64; STATE_LEN]) -> Result<DMat3, SingularGeometry> {
        orthonormalize(rotation_at(y))
    }

    /// Returns the signed rotation of the body `x` axis about world `z`, in radians.
    ///
    /// # Errors
    ///
    /// Returns an error if the rotation block is degenerate.
    pub fn planar_angle(&self, y: &[f64; STATE_LEN]) -> Result<f64, SingularGeometry> {
        let axis = self.orientation(y)? * DVec3::X;
        Ok(axis.y.atan2(axis.x))
    }

    /// Returns the world-frame linear velocity.
    #[must_use]
    pub fn velocity(&self, y: &[f64; STATE_LEN]) -> DVec3 {
        state::vec3_at(y, MOMENTUM) / self.mass
    }
}

impl Dynamics<STATE_LEN> for RigidBody {
    type Neighbors = ();
    type Error = SingularGeometry;

    fn derivative(
        &self,
        _time: f64,
        y: &[f64; STATE_LEN],
        _: &(),
    ) -> Result<[f64; STATE_LEN], SingularGeometry> {
        let position = state::vec3_at(y, POSITION);
        let rotation = orthonormalize(rotation_at(y))?;
        let angular_momentum = state::vec3_at(y, ANGULAR_MOMENTUM);

        let velocity = self.velocity(y);
        let inertia_inv = rotation * self.inertia_inv * rotation.transpose();
        let omega = inertia_inv * angular_momentum;

        let mut force = DVec3::new(0.0, -self.mass * self.gravity, 0.0) - self.damping * velocity;
        let mut torque = DVec3::ZERO;

        if let Some(spring) = &self.spring {
            let arm = rotation * spring.attachment;
            let d = position + arm - spring.anchor;
            let length = d.length();
            if length == 0.0 {
                return Err(SingularGeometry::ZeroLengthSpring);
            }
            let pull = -spring.stiffness * (length - spring.rest_length) * d / length;
            force += pull;
            torque += arm.cross(pull);
        }

        let mut rate = [0.0; STATE_LEN];
        state::put_vec3(&mut rate, POSITION, velocity);
        put_rotation(&mut rate, star(omega) * rotation);
        state::put_vec3(&mut rate, MOMENTUM, force);
        state::put_vec3(&mut rate, ANGULAR_MOMENTUM, torque);
        Ok(rate)
    }

    fn position(&self, y: &[f64; STATE_LEN]) -> DVec3 {
        state::vec3_at(y, POSITION)
    }
}

/// Reads the row-major rotation block.
#[must_use]
pub fn rotation_at(y: &[f64; STATE_LEN]) -> DMat3 {
    DMat3::from_cols(
        state::vec3_at(y, ROTATION),
        state::vec3_at(y, ROTATION + 3),
        state::vec3_at(y, ROTATION + 6),
    )
    .transpose()
}

fn put_rotation(y: &mut [f64; STATE_LEN], rotation: DMat3) {
    let rows = rotation.transpose();
    state::put_vec3(y, ROTATION, rows.x_axis);
    state::put_vec3(y, ROTATION + 3, rows.y_axis);
    state::put_vec3(y, ROTATION + 6, rows.z_axis);
}

/// Gram-Schmidt orthonormalization of the rows of `m`.
///
/// The first row keeps its direction, the third is made normal to the first
/// two, and the second is rebuilt from the other two.
///
/// # Errors
///
/// Returns an error if the first two rows are zero or collinear.
pub fn orthonormalize(m: DMat3) -> Result<DMat3, SingularGeometry> {
    let rows = m.transpose();

    let r0 = rows.x_axis.try_normalize().ok_or(SingularGeometry::DegenerateRotation)?;
    let r2 = r0
        .cross(rows.y_axis)
        .try_normalize()
        .ok_or(SingularGeometry::DegenerateRotation)?;
    let r1 = r2
        .cross(r0)
        .try_normalize()
        .ok_or(SingularGeometry::DegenerateRotation)?;

    Ok(DMat3::from_cols(r0, r1, r2).transpose())
}

/// The skew-symmetric matrix with `star(a) * b == a.cross(b)`.
#[must_use]
pub fn star(v: DVec3) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(0.0, v.z, -v.y),
        DVec3::new(-v.z, 0.0, v.x),
        DVec3::new(v.y, -v.x, 0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn at_rest(body: &RigidBody) -> [f64; STATE_LEN] {
        body.initial_state(DVec3::ZERO, DMat3::IDENTITY, DVec3::ZERO, DVec3::ZERO)
    }

    #[test]
    fn star_matches_cross_product() {
        let a = DVec3::new(1.0, -2.0, 3.0);
        let b = DVec3::new(0.5, 4.0, -1.0);
        assert_eq!(star(a) * b, a.cross(b));
    }

    #[test]
    fn rotation_block_is_row_major() {
        let body = RigidBody::new(Parameters::default()).unwrap();
        let rotation = DMat3::from_rotation_z(0.3);
        let y = body.initial_state(DVec3::ZERO, rotation, DVec3::ZERO, DVec3::ZERO);

        // Row 0 of a z-rotation is (cos, -sin, 0).
        assert_relative_eq!(y[3], 0.3_f64.cos());
        assert_relative_eq!(y[4], -(0.3_f64.sin()));
        assert_eq!(rotation_at(&y), rotation);
    }

    #[test]
    fn orthonormalize_repairs_drift() {
        let drifted = DMat3::from_rotation_z(0.7) + DMat3::from_cols_array(&[1e-3; 9]);
        let r = orthonormalize(drifted).unwrap();

        assert!((r.transpose() * r).abs_diff_eq(DMat3::IDENTITY, 1e-12));
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_rotation_is_singular() {
        let collinear = DMat3::from_cols(DVec3::X, DVec3::X, DVec3::Z).transpose();
        assert_eq!(
            orthonormalize(collinear),
            Err(SingularGeometry::DegenerateRotation)
        );
        assert_eq!(
            orthonormalize(DMat3::ZERO),
            Err(SingularGeometry::DegenerateRotation)
        );
    }

    #[test]
    fn free_body_only_falls() {
        let body = RigidBody::new(Parameters::default()).unwrap();
        let rate = body.derivative(0.0, &at_rest(&body), &()).unwrap();

        let mut expected = [0.0; STATE_LEN];
        expected[13] = -9.81;
        assert_eq!(rate, expected);
    }

    #[test]
    fn spinning_body_rotates_its_frame() {
        let body = RigidBody::new(Parameters::default().gravity_si(0.0)).unwrap();
        let y = body.initial_state(DVec3::ZERO, DMat3::IDENTITY, DVec3::ZERO, DVec3::Z);

        let rate = body.derivative(0.0, &y, &()).unwrap();

        // dR/dt = star(ω)·I, row-major.
        let expected = star(DVec3::Z);
        assert_eq!(rotation_at(&rate), expected);
        assert_eq!(rate[18], 0.0);
    }

    #[test]
    fn offset_tether_produces_torque() {
        let tether = Tether::from_si(DVec3::new(0.0, 2.0, 0.0), DVec3::new(1.0, 0.0, 0.0), 10.0, 1.0);
        let body = RigidBody::new(Parameters::default().gravity_si(0.0).tether(tether)).unwrap();

        let rate = body.derivative(0.0, &at_rest(&body), &()).unwrap();

        // Attachment at (1, 0, 0), anchor at (0, 2, 0): length √5, stretch √5 − 1.
        let d = DVec3::new(1.0, -2.0, 0.0);
        let pull = -10.0 * (5.0_f64.sqrt() - 1.0) * d / 5.0_f64.sqrt();
        assert_relative_eq!(rate[12], pull.x, epsilon = 1e-12);
        assert_relative_eq!(rate[13], pull.y, epsilon = 1e-12);

        let torque = DVec3::X.cross(pull);
        assert_abs_diff_eq!(rate[15], 0.0);
        assert_abs_diff_eq!(rate[16], 0.0);
        assert_relative_eq!(rate[17], torque.z, epsilon = 1e-12);
    }

    #[test]
    fn planar_angle_is_signed() {
        let body = RigidBody::new(Parameters::default()).unwrap();
        for angle in [0.4, -1.2, 2.5] {
            let y = body.initial_state(
                DVec3::ZERO,
                DMat3::from_rotation_z(angle),
                DVec3::ZERO,
                DVec3::ZERO,
            );
            assert_relative_eq!(body.planar_angle(&y).unwrap(), angle, epsilon = 1e-12);
        }
    }

    #[test]
    fn rejects_singular_inertia() {
        let parameters = Parameters::default().inertia(DMat3::from_diagonal(DVec3::new(1.0, 0.0, 1.0)));
        assert_eq!(RigidBody::new(parameters), Err(ConfigError::SingularInertia));
    }

    #[test]
    fn cuboid_inertia_of_a_cube() {
        let inertia = cuboid_inertia(6.0, DVec3::splat(2.0));
        assert_eq!(inertia, DMat3::from_diagonal(DVec3::splat(4.0)));
    }
}

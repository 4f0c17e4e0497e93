//! Derived quantities used by model parameters.

use uom::{
    si::{
        ISQ, Quantity, SI,
        f64::{Area, Force, Length, Mass, Velocity},
        area::square_meter,
        force::newton,
        length::meter,
        mass::kilogram,
        velocity::meter_per_second,
    },
    typenum::{N1, N2, P1, P3, Z0},
};

/// Stiffness is a force per unit length (N/m or kg/s²).
pub type Stiffness = Quantity<ISQ<Z0, P1, N2, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Linear damping is a force per unit velocity (N·s/m or kg/s).
pub type Damping = Quantity<ISQ<Z0, P1, N1, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// The gravitational constant has units of m³/(kg·s²).
pub type GravitationalConstant = Quantity<ISQ<P3, N1, N2, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Creates a stiffness from SI units (N/m).
#[must_use]
pub fn stiffness_si(value: f64) -> Stiffness {
    Force::new::<newton>(value) / Length::new::<meter>(1.0)
}

/// Creates a damping coefficient from SI units (N·s/m).
#[must_use]
pub fn damping_si(value: f64) -> Damping {
    Force::new::<newton>(value) / Velocity::new::<meter_per_second>(1.0)
}

/// Creates a gravitational constant from SI units (m³/(kg·s²)).
#[must_use]
pub fn gravitational_constant_si(value: f64) -> GravitationalConstant {
    let unit_mass = Mass::new::<kilogram>(1.0);
    Force::new::<newton>(value) * Area::new::<square_meter>(1.0) / (unit_mass * unit_mass)
}

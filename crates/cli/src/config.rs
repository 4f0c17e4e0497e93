//! Scenario configuration loaded from an optional TOML file.
//!
//! Every field has a default, so an empty file (or none at all) runs the
//! classroom setups. A file only needs the values it overrides:
//!
//! ```toml
//! [solver]
//! rel_tol = 1e-9
//!
//! [projectile]
//! speed = 90.0
//! drag = { model = "quadratic", k = 0.002 }
//!
//! [orbit]
//! ticks = 50000
//! band = [3.0e8, 4.5e8]
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use kinetic_models::{fall::DEFAULT_CLEARANCE, gravitation, projectile::Drag};
use kinetic_solvers::transient::rkf78;
use serde::Deserialize;

/// The complete scenario file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub solver: SolverConfig,
    pub projectile: ProjectileConfig,
    pub orbit: OrbitConfig,
    pub bounce: BounceConfig,
    pub springs: SpringsConfig,
    pub rigid: RigidConfig,
    pub fall: FallConfig,
}

impl Scenario {
    /// Reads a scenario file, or returns the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid scenario {}", path.display()))
    }
}

/// Integrator tolerances shared by every exercise.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub rel_tol: f64,
    pub abs_tol: f64,
    pub max_steps: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let config = rkf78::Config::default();
        Self {
            rel_tol: config.rel_tol(),
            abs_tol: config.abs_tol(),
            max_steps: config.max_steps(),
        }
    }
}

impl SolverConfig {
    pub fn build(&self) -> Result<rkf78::Config> {
        rkf78::Config::new(self.rel_tol, self.abs_tol, self.max_steps)
            .context("invalid solver configuration")
    }
}

/// Air resistance model for the projectile.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase", deny_unknown_fields)]
pub enum DragConfig {
    None,
    Linear { gamma: f64 },
    Quadratic { k: f64 },
}

impl From<DragConfig> for Drag {
    fn from(config: DragConfig) -> Self {
        match config {
            DragConfig::None => Drag::None,
            DragConfig::Linear { gamma } => Drag::linear_si(gamma),
            DragConfig::Quadratic { k } => Drag::quadratic_si(k),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectileConfig {
    /// Launch speed in m/s.
    pub speed: f64,
    /// Launch elevation in degrees.
    pub elevation: f64,
    pub gravity: f64,
    pub drag: DragConfig,
    pub dt: f64,
    pub max_ticks: usize,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 70.0,
            elevation: 50.0,
            gravity: 9.81,
            drag: DragConfig::Linear { gamma: 1e-4 },
            dt: 0.033,
            max_ticks: 100_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrbitConfig {
    pub earth_mass: f64,
    pub moon_mass: f64,
    /// Initial Earth–Moon distance in m.
    pub distance: f64,
    /// Initial Moon speed in m/s, perpendicular to the Earth–Moon line.
    pub moon_speed: f64,
    pub dt: f64,
    pub ticks: usize,
    /// Stop the run if the separation leaves `[min, max]`.
    pub band: Option<[f64; 2]>,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            earth_mass: gravitation::EARTH_MASS,
            moon_mass: gravitation::MOON_MASS,
            distance: gravitation::EARTH_MOON_DISTANCE,
            moon_speed: gravitation::MOON_SPEED,
            dt: gravitation::EARTH_MOON_DT,
            ticks: 10_000,
            band: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BounceConfig {
    /// Drop height in m.
    pub height: f64,
    pub gravity: f64,
    pub clearance: f64,
    pub dt: f64,
    /// Simulated duration in s.
    pub duration: f64,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            height: 100.0,
            gravity: 9.8,
            clearance: DEFAULT_CLEARANCE,
            dt: 0.033,
            duration: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpringsConfig {
    /// Number of nodes in the hanging chain.
    pub nodes: usize,
    pub mass: f64,
    pub stiffness: f64,
    pub damping: f64,
    pub gravity: f64,
    pub rest_length: f64,
    /// Initial sideways displacement of the lowest node in m.
    pub offset: f64,
    pub dt: f64,
    pub ticks: usize,
}

impl Default for SpringsConfig {
    fn default() -> Self {
        Self {
            nodes: 3,
            mass: 1.0,
            stiffness: 10.0,
            damping: 0.2,
            gravity: 9.8,
            rest_length: 10.0,
            offset: 2.0,
            dt: 0.033,
            ticks: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RigidConfig {
    pub mass: f64,
    /// Edge length of the cubic body in m.
    pub width: f64,
    pub gravity: f64,
    pub damping: f64,
    pub stiffness: f64,
    pub rest_length: f64,
    pub anchor: [f64; 3],
    pub attachment: [f64; 3],
    pub position: [f64; 3],
    pub angular_velocity: [f64; 3],
    pub dt: f64,
    pub ticks: usize,
}

impl Default for RigidConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            width: 1.0,
            gravity: 9.81,
            damping: 0.1,
            stiffness: 10.0,
            rest_length: 1.0,
            anchor: [0.0, 0.0, 0.0],
            attachment: [0.5, 0.5, 0.0],
            position: [0.0, -1.0, 0.0],
            angular_velocity: [0.0, 0.0, 0.1],
            dt: 0.1,
            ticks: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallConfig {
    /// Drop height in m.
    pub height: f64,
    pub gravity: f64,
    pub dt: f64,
    pub max_ticks: usize,
}

impl Default for FallConfig {
    fn default() -> Self {
        Self {
            height: 100.0,
            gravity: 9.81,
            dt: 0.033,
            max_ticks: 100_000,
        }
    }
}

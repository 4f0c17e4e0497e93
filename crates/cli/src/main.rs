//! Headless driver for the Kinetic classroom simulations.
//!
//! Each subcommand runs one exercise with the defaults of the classroom setup,
//! optionally overridden by a TOML scenario file. Progress is logged with
//! `tracing`; set `RUST_LOG=debug` for per-tick detail.

mod config;
mod exercise;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{config::Scenario, exercise::FallOptions};

#[derive(Parser, Debug)]
#[command(name = "kinetic", version, about)]
struct Cli {
    /// TOML scenario file overriding the defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    exercise: Exercise,
}

#[derive(Subcommand, Debug)]
enum Exercise {
    /// Launch a projectile and report where it lands.
    Projectile,

    /// Integrate the Earth–Moon system.
    Orbit,

    /// Drop a ball that bounces off the floor.
    Bounce,

    /// Let a chain of damped springs settle.
    Springs,

    /// Swing a tethered rigid body.
    Rigid,

    /// Drop a ball, resuming from and saving to a checkpoint.
    Fall {
        /// Directory holding the checkpoint files.
        #[arg(long, default_value = ".")]
        checkpoint_dir: PathBuf,

        /// Quit after this many simulated seconds and save a checkpoint.
        #[arg(long)]
        quit_after: Option<f64>,

        /// Ignore any saved checkpoint.
        #[arg(long)]
        fresh: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let scenario = Scenario::load(cli.config.as_deref())?;
    let solver = scenario.solver.build()?;

    match cli.exercise {
        Exercise::Projectile => exercise::projectile(&scenario.projectile, solver),
        Exercise::Orbit => exercise::orbit(&scenario.orbit, solver),
        Exercise::Bounce => exercise::bounce(&scenario.bounce, solver),
        Exercise::Springs => exercise::springs(&scenario.springs, solver),
        Exercise::Rigid => exercise::rigid(&scenario.rigid, solver),
        Exercise::Fall {
            checkpoint_dir,
            quit_after,
            fresh,
        } => exercise::fall(
            &scenario.fall,
            solver,
            FallOptions {
                checkpoint_dir: &checkpoint_dir,
                quit_after,
                fresh,
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_fall_options() {
        let cli = Cli::try_parse_from(["kinetic", "fall", "--quit-after", "2.5", "--fresh"]).unwrap();
        assert!(matches!(
            cli.exercise,
            Exercise::Fall {
                quit_after: Some(q),
                fresh: true,
                ..
            } if q == 2.5
        ));
    }
}

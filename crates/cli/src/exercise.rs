//! One driver per classroom exercise.
//!
//! Each driver builds its models from the scenario, advances them at the
//! configured frame step, and logs a summary.

use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use glam::{DMat3, DVec2, DVec3};
use kinetic_core::Observer;
use kinetic_models::{
    Contact, Entity, Floor, StepReport,
    checkpoint::{Checkpoint, CheckpointStore},
    fall::{Bounce, Fall},
    gravitation::{self, HeavenlyBody, Universe},
    playback::{Command, Frame, Playback},
    projectile::{self, Ballistics},
    rigid_body::{self, RigidBody, Tether, cuboid_inertia},
    spring::{self, Spring, SpringAnchor, SpringNetwork, SpringNode},
    system::{Action, Event, Status},
};
use kinetic_observers::{FailFast, Recorder, SeparationMonitor};
use kinetic_solvers::transient::rkf78;
use tracing::{debug, info, warn};
use uom::si::{f64::Length, length::meter};

use crate::config::{
    BounceConfig, FallConfig, OrbitConfig, ProjectileConfig, RigidConfig, SpringsConfig,
};

pub fn projectile(config: &ProjectileConfig, solver: rkf78::Config) -> Result<()> {
    let parameters = projectile::Parameters::default()
        .gravity_si(config.gravity)
        .drag(config.drag.into());
    let mut shell = Entity::new(Ballistics::new(parameters)?)
        .with_config(solver)
        .terminate_below(projectile::ground());
    shell.setup(
        projectile::launch_si(DVec2::ZERO, config.speed, config.elevation),
        0.0,
    )?;

    let mut recorder = Recorder::<2>::new(["x", "y"]);
    for _ in 0..config.max_ticks {
        let report = shell.step(config.dt, &())?;
        let [x, y, ..] = *shell.state();
        recorder.record(report.time(), [Some(x), Some(y)]);

        if let StepReport::Terminated { time } = report {
            let apex = recorder.series(1).map(|(_, y)| y).fold(f64::MIN, f64::max);
            info!(range = x, apex, flight_time = time, "projectile landed");
            return Ok(());
        }
    }

    bail!("projectile still airborne after {} ticks", config.max_ticks)
}

pub fn orbit(config: &OrbitConfig, solver: rkf78::Config) -> Result<()> {
    let mut earth = HeavenlyBody::from_si(config.earth_mass)?.with_config(solver);
    earth.setup(DVec2::ZERO, DVec2::ZERO, 0.0)?;
    let mut moon = HeavenlyBody::from_si(config.moon_mass)?.with_config(solver);
    moon.setup(
        DVec2::new(config.distance, 0.0),
        DVec2::new(0.0, config.moon_speed),
        0.0,
    )?;

    let mut universe = Universe::new(config.dt)?;
    universe.add_entity("earth", earth);
    universe.add_entity("moon", moon);
    let initial_energy = gravitation::total_energy(&universe);

    let mut monitor = SeparationMonitor::new("earth", "moon");
    if let Some([min, max]) = config.band {
        monitor = monitor.within(min, max);
    }

    let solution = universe.run(config.ticks, |event: &Event<'_, HeavenlyBody>| {
        let stop: Option<Action> = FailFast.observe(event);
        stop.or_else(|| monitor.observe(event))
    });

    let energy = gravitation::total_energy(&universe);
    let drift = ((energy - initial_energy) / initial_energy).abs();
    info!(
        ticks = solution.ticks,
        elapsed = universe.elapsed(),
        energy_drift = drift,
        closest = monitor.closest().map(|(_, d)| d),
        farthest = monitor.farthest().map(|(_, d)| d),
        eccentricity = monitor.eccentricity(),
        "orbit finished"
    );

    if solution.status == Status::StoppedByObserver {
        if let Some((time, separation)) = monitor.breach() {
            warn!(time, separation, "separation left the band");
        } else {
            bail!("a body failed to step; see the log for details");
        }
    }
    Ok(())
}

pub fn bounce(config: &BounceConfig, solver: rkf78::Config) -> Result<()> {
    let policy = Bounce::from_si(config.height, config.gravity)?
        .with_clearance(Length::new::<meter>(config.clearance))?;
    let mut ball = Entity::new(Fall::from_si(config.gravity)?)
        .with_config(solver)
        .with_policy(policy);
    ball.setup([config.height, 0.0], 0.0)?;
    ensure!(config.duration.is_finite(), "bounce duration must be finite");

    let mut bounces = 0_usize;
    let mut lowest = config.height;
    while ball.time() < config.duration {
        let report = ball.step(config.dt, &())?;
        if let StepReport::Advanced {
            time,
            contact: Contact::Corrected,
        } = report
        {
            bounces += 1;
            debug!(time, bounces, "bounce");
        }
        lowest = lowest.min(ball.state()[0]);
    }

    ensure!(lowest > 0.0, "ball passed through the floor");
    info!(bounces, lowest, duration = ball.time(), "bouncing finished");
    Ok(())
}

pub fn springs(config: &SpringsConfig, solver: rkf78::Config) -> Result<()> {
    ensure!(config.nodes > 0, "a spring chain needs at least one node");

    let parameters = spring::Parameters::default()
        .mass_si(config.mass)
        .stiffness_si(config.stiffness)
        .damping_si(config.damping)
        .gravity_si(config.gravity)
        .rest_length_si(config.rest_length);
    let spring = Spring::new(parameters)?;

    let mut network = SpringNetwork::new(config.dt)?;
    for i in 0..config.nodes {
        let anchor = match i {
            0 => SpringAnchor::Fixed(DVec2::ZERO),
            _ => SpringAnchor::Linked(node_name(i - 1)),
        };
        // Only the lowest node starts displaced.
        let x = if i + 1 == config.nodes { config.offset } else { 0.0 };
        let y = -config.rest_length * (i + 1) as f64;

        let mut node = SpringNode::new(spring)
            .with_config(solver)
            .with_anchors([Some(anchor), None]);
        node.setup(DVec2::new(x, y), DVec2::ZERO, 0.0)?;
        network.add_entity(node_name(i), node);
    }
    spring::validate_links(&network)?;

    let solution = network.run(config.ticks, FailFast);
    if solution.status == Status::StoppedByObserver {
        bail!("spring chain failed after {} ticks", solution.ticks);
    }

    for (name, node) in network.iter() {
        let position = node.position();
        info!(node = name, x = position.x, y = position.y, "final position");
    }
    Ok(())
}

fn node_name(i: usize) -> String {
    format!("node{i}")
}

pub fn rigid(config: &RigidConfig, solver: rkf78::Config) -> Result<()> {
    let tether = Tether::from_si(
        DVec3::from_array(config.anchor),
        DVec3::from_array(config.attachment),
        config.stiffness,
        config.rest_length,
    );
    let parameters = rigid_body::Parameters::default()
        .mass_si(config.mass)
        .inertia(cuboid_inertia(config.mass, DVec3::splat(config.width)))
        .gravity_si(config.gravity)
        .damping_si(config.damping)
        .tether(tether);
    let dynamics = RigidBody::new(parameters)?;

    let initial = dynamics.initial_state(
        DVec3::from_array(config.position),
        DMat3::IDENTITY,
        DVec3::ZERO,
        DVec3::from_array(config.angular_velocity),
    );
    let mut body = Entity::new(dynamics).with_config(solver);
    body.setup(initial, 0.0)?;

    for _ in 0..config.ticks {
        body.step(config.dt, &())?;
        let angle = body.dynamics().planar_angle(body.state())?;
        debug!(
            time = body.time(),
            angle = angle.to_degrees(),
            x = body.position().x,
            y = body.position().y,
            "rigid body"
        );
    }

    let angle = body.dynamics().planar_angle(body.state())?;
    info!(
        time = body.time(),
        angle = angle.to_degrees(),
        x = body.position().x,
        y = body.position().y,
        "rigid body finished"
    );
    Ok(())
}

/// Options for the resumable free-fall exercise.
#[derive(Debug, Clone, Copy)]
pub struct FallOptions<'a> {
    pub checkpoint_dir: &'a Path,
    /// Simulated time at which to quit and save a checkpoint.
    pub quit_after: Option<f64>,
    /// Ignore any existing checkpoint.
    pub fresh: bool,
}

pub fn fall(config: &FallConfig, solver: rkf78::Config, options: FallOptions<'_>) -> Result<()> {
    ensure!(
        config.gravity > 0.0,
        "the ball never reaches the ground unless gravity is positive"
    );
    ensure!(config.dt > 0.0, "the frame step must be positive");

    let store = CheckpointStore::new(options.checkpoint_dir);
    let resumed = if options.fresh {
        None
    } else {
        store.load().context("failed to read checkpoint")?
    };
    let start = resumed.unwrap_or(Checkpoint {
        position: config.height,
        velocity: 0.0,
        time: 0.0,
    });

    let mut ball = Entity::new(Fall::from_si(config.gravity)?)
        .with_config(solver)
        .terminate_below(Floor {
            index: 0,
            level: 0.0,
        });
    ball.setup([start.position, start.velocity], start.time)?;
    if resumed.is_some() {
        info!(height = start.position, time = start.time, "resuming fall");
    }

    // Playback starts paused, so the first frame resumes it.
    let mut playback = Playback::new();
    let mut command = Some(Command::Resume);
    let mut ticks = 0_usize;
    loop {
        match playback.frame(command.take()) {
            Frame::Hold => {}
            Frame::Advance => {
                if ticks == config.max_ticks {
                    bail!("ball still falling after {} ticks", config.max_ticks);
                }
                ticks += 1;
                if let StepReport::Terminated { time } = ball.step(config.dt, &())? {
                    info!(time, velocity = ball.state()[1], "ball reached the ground");
                    store.clear()?;
                    return Ok(());
                }
            }
            Frame::Quit => {
                let [position, velocity] = *ball.state();
                store.save(&Checkpoint {
                    position,
                    velocity,
                    time: ball.time(),
                })?;
                info!(height = position, time = ball.time(), "quit with checkpoint");
                return Ok(());
            }
        }

        if options.quit_after.is_some_and(|quit| ball.time() >= quit) {
            command = Some(Command::Quit);
        }
    }
}

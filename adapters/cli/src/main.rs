#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Cat Siege encounter.

mod pilot;
mod report;
mod scenario;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Result};
use cat_siege_core::{SessionPhase, Viewport, GAME_TITLE};
use cat_siege_session::{AabbOverlaps, SessionController};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{pilot::EvasivePilot, report::RunReport};

/// Runs a scripted encounter against the stage table and prints a report.
#[derive(Debug, Parser)]
#[command(name = "cat-siege", version, about)]
struct CliArgs {
    /// Scenario file with stage and texture definitions; the bundled classic scenario when absent.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Seed for spawn placement.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Simulated seconds after which a surviving run stops.
    #[arg(long, default_value_t = 180.0)]
    seconds: f64,
    /// Fixed simulation step in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Playfield width in pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f32,
    /// Playfield height in pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f32,
}

/// Entry point for the Cat Siege command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();
    ensure!(args.tick_ms > 0, "tick length must be positive");
    ensure!(
        args.width > 0.0 && args.height > 0.0,
        "viewport must have a positive size, got {}x{}",
        args.width,
        args.height
    );
    ensure!(
        args.seconds.is_finite() && args.seconds >= 0.0,
        "run length must be a non-negative number of seconds"
    );

    let viewport = Viewport::new(args.width, args.height);
    let config = match &args.scenario {
        Some(path) => scenario::load(path, viewport)?,
        None => scenario::parse(scenario::CLASSIC_SCENARIO, viewport)?,
    };

    let mut session = SessionController::new(config, args.seed);
    let mut report = RunReport::default();
    let mut detector = AabbOverlaps;
    let pilot = EvasivePilot;
    let dt = Duration::from_millis(args.tick_ms);
    let budget = Duration::from_secs_f64(args.seconds);

    info!(title = GAME_TITLE, seed = args.seed, "starting encounter");
    session.start();
    session.flush(&mut report);
    loop {
        let snapshot = session.snapshot();
        if snapshot.phase != SessionPhase::Running || snapshot.elapsed >= budget {
            break;
        }
        let input = pilot.steer(session.world());
        session.tick(dt, &input, &mut detector, &mut report);
    }

    let snapshot = session.snapshot();
    let progress = session.progress();
    info!(
        phase = ?snapshot.phase,
        score = snapshot.score,
        stage = snapshot.stage.get(),
        "encounter finished"
    );
    println!("{}", report.summary(&snapshot, &progress));
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

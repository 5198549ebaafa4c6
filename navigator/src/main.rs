//! Navigation supervisor CLI.
//!
//! Runs supervised trips against the built-in kinematic backend. The CLI is
//! a thin adapter: it builds a [`TripRequest`], hands it to the supervisor,
//! prints the outcome, and maps it to a stable exit code.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::seq::IteratorRandom;

use navigator::core::landmarks::LandmarkTable;
use navigator::core::signals::canonical_signals;
use navigator::core::validate::{check_separation, resolve_endpoints};
use navigator::exit_codes;
use navigator::io::agent::WaypointAgent;
use navigator::io::client::SimulatorClient;
use navigator::io::clock::SystemClock;
use navigator::io::config::{load_config, SupervisorConfig};
use navigator::io::playground::PlaygroundWorld;
use navigator::trip::{Navigator, TripRequest};

#[derive(Parser)]
#[command(
    name = "navigator",
    version,
    about = "Supervised point-to-point navigation in a simulated world"
)]
struct Cli {
    /// Path to the supervisor config TOML (defaults apply when missing).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drive a trip from one landmark to another.
    Run {
        /// Start landmark name, or `random` to pick one.
        #[arg(long)]
        start: String,
        /// End landmark name.
        #[arg(long)]
        end: String,
        /// Trip timeout in seconds (config default when omitted).
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// List the landmarks available as trip endpoints.
    Landmarks,
    /// Check a request without provisioning anything.
    Validate {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
}

fn main() {
    navigator::logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(exit_codes::REJECTED);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SupervisorConfig::default(),
    };

    match cli.command {
        Command::Run {
            start,
            end,
            timeout_secs,
        } => cmd_run(config, &start, &end, timeout_secs),
        Command::Landmarks => cmd_landmarks(),
        Command::Validate { start, end } => cmd_validate(config, &start, &end),
    }
}

/// Build the session world and its landmark table, drawing the landmark
/// name markers the way a session starts in the simulator.
fn session_world() -> Result<(PlaygroundWorld, LandmarkTable)> {
    let mut world = PlaygroundWorld::new();
    let spawn_points = world.spawn_points().context("query spawn points")?;
    let landmarks =
        LandmarkTable::from_spawn_points(&spawn_points).context("build landmark table")?;
    for (name, pose) in landmarks.iter() {
        world
            .draw_marker(&pose.position, name)
            .context("draw landmark marker")?;
    }
    Ok((world, landmarks))
}

fn cmd_run(
    config: SupervisorConfig,
    start: &str,
    end: &str,
    timeout_secs: Option<u64>,
) -> Result<i32> {
    let (mut world, landmarks) = session_world()?;

    let start = if start == "random" {
        let mut rng = rand::thread_rng();
        landmarks
            .names()
            .choose(&mut rng)
            .context("landmark table is empty")?
            .to_string()
    } else {
        start.to_string()
    };

    let mut request = TripRequest::new(start, end);
    if let Some(secs) = timeout_secs {
        request = request.with_timeout(Duration::from_secs(secs));
    }

    let navigator = Navigator::new(config, landmarks, canonical_signals());
    let mut agent = WaypointAgent::new();
    let report = navigator.run_trip(&mut world, &mut agent, &SystemClock, &request);

    println!("{}", report.outcome);
    println!(
        "steps: {}, elapsed: {:.1}s",
        report.steps,
        report.elapsed.as_secs_f64()
    );
    Ok(exit_codes::for_outcome(&report.outcome))
}

fn cmd_landmarks() -> Result<i32> {
    let (_, landmarks) = session_world()?;
    for (name, pose) in landmarks.iter() {
        println!(
            "{name}: x={:.2}, y={:.2}, z={:.2}",
            pose.position.x, pose.position.y, pose.position.z
        );
    }
    Ok(exit_codes::ARRIVED)
}

fn cmd_validate(config: SupervisorConfig, start: &str, end: &str) -> Result<i32> {
    let (world, landmarks) = session_world()?;
    let (start_pose, end_pose) = match resolve_endpoints(&landmarks, start, end) {
        Ok(poses) => poses,
        Err(err) => {
            println!("rejected: {err}");
            return Ok(exit_codes::REJECTED);
        }
    };
    let start_road = world.project_to_road(start_pose)?;
    let end_road = world.project_to_road(end_pose)?;
    match check_separation(&start_road, &end_road, config.min_trip_separation) {
        Ok(separation) => {
            println!("ok: endpoints are {separation:.2} units apart");
            Ok(exit_codes::ARRIVED)
        }
        Err(err) => {
            println!("rejected: {err}");
            Ok(exit_codes::REJECTED)
        }
    }
}

//! Fly a full mission against the kinematic simulator.
//!
//! The simulator and the mission runner talk only through the SDK channels:
//! commands flow out of the runner's `ChannelLink`, telemetry flows back through a
//! `TelemetryFeed`.
//!
//! Usage:
//!   cargo run -p skyroute-cli --bin fly_mission -- --colliders data/colliders_sample.csv \
//!       --goal-north 20 --goal-east 20

use anyhow::{Context, Result};
use clap::Parser;
use skyroute_cli::sim::{SimParams, SimVehicle};
use skyroute_cli::{goal_from_args, Config};
use skyroute_core::{load_colliders, FlightPhaseController, LocalPosition};
use skyroute_sdk::{spawn_mission, ChannelLink, MissionRunner, TelemetryFeed};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulated mission: arm, plan, fly, land")]
struct Args {
    /// Obstacle file (overrides SKYROUTE_COLLIDERS)
    #[arg(long)]
    colliders: Option<PathBuf>,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    start_north: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    start_east: f64,

    #[arg(long, allow_hyphen_values = true)]
    goal_lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    goal_lon: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    goal_north: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    goal_east: Option<f64>,

    #[arg(long)]
    cruise_altitude: Option<f64>,

    #[arg(long)]
    safety_margin: Option<f64>,

    /// Simulation rate
    #[arg(long, default_value_t = 10.0)]
    rate_hz: f64,

    /// Give up after this many simulation ticks
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,

    /// Uniform noise on reported north/east, meters
    #[arg(long, default_value_t = 0.0)]
    noise: f64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Pace ticks in wall-clock time instead of running as fast as possible
    #[arg(long)]
    realtime: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("skyroute_core=info".parse()?)
            .add_directive("fly_mission=info".parse()?))
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.rate_hz > 0.0, "--rate-hz must be positive");

    let config = Config::from_env().with_overrides(
        args.colliders,
        args.cruise_altitude,
        args.safety_margin,
    );
    let map = load_colliders(&config.colliders_path)
        .with_context(|| format!("loading {}", config.colliders_path.display()))?;

    let params = SimParams {
        position_noise_m: args.noise,
        ..SimParams::default()
    };
    let mut sim = SimVehicle::new(
        map.home,
        LocalPosition::new(args.start_north, args.start_east, 0.0),
        params,
        args.seed,
    );

    let (link, mut commands) = ChannelLink::channel();
    let (feed, telemetry) = TelemetryFeed::channel();
    for event in sim.step(0.0) {
        feed.send(event).await?;
    }

    let goal = goal_from_args(args.goal_lat, args.goal_lon, args.goal_north, args.goal_east);
    let controller = FlightPhaseController::new(map, goal, config.planner);
    let mission = spawn_mission(MissionRunner::new(controller, link), telemetry);

    let dt = 1.0 / args.rate_hz;
    let mut interval = time::interval(Duration::from_secs_f64(dt));
    let mut ticks = 0u64;

    'sim: while !mission.is_finished() {
        if args.realtime {
            interval.tick().await;
        } else {
            tokio::task::yield_now().await;
        }

        while let Ok(command) = commands.try_recv() {
            tracing::debug!(?command, "Simulator applying command");
            command.apply_to(&mut sim);
        }

        for event in sim.step(dt) {
            if feed.send(event).await.is_err() {
                break 'sim;
            }
        }

        ticks += 1;
        if ticks >= args.max_ticks {
            tracing::warn!(ticks, "Tick limit reached, stopping simulation");
            break;
        }
    }
    drop(feed);

    let report = mission.await.context("mission task panicked")??;
    let position = sim.position();
    tracing::info!(
        ticks,
        sim_seconds = ticks as f64 * dt,
        north = position.north,
        east = position.east,
        route_waypoints = sim.route().len(),
        "Mission finished"
    );
    println!("{}", serde_json::to_string_pretty(&report.transitions)?);
    Ok(())
}

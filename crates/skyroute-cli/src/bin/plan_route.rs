//! Plan a route over an obstacle file and print the waypoints as JSON.
//!
//! Usage:
//!   cargo run -p skyroute-cli --bin plan_route -- --colliders data/colliders_sample.csv \
//!       --start-north -20 --start-east -20 --goal-north 20 --goal-east 20

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use skyroute_cli::{goal_from_args, Config};
use skyroute_core::{
    load_colliders, local_to_global, plan_mission, GridCell, LocalPosition, Waypoint,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan a collision-free route through an obstacle map")]
struct Args {
    /// Obstacle file (overrides SKYROUTE_COLLIDERS)
    #[arg(long)]
    colliders: Option<PathBuf>,

    /// Start position north of home, meters
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    start_north: f64,

    /// Start position east of home, meters
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

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct RouteOutput {
    start: GridCell,
    goal: GridCell,
    raw_cells: usize,
    nodes_expanded: usize,
    waypoints: Vec<Waypoint>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("skyroute_core=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env().with_overrides(
        args.colliders,
        args.cruise_altitude,
        args.safety_margin,
    );

    let map = load_colliders(&config.colliders_path)
        .with_context(|| format!("loading {}", config.colliders_path.display()))?;
    let start = local_to_global(
        &LocalPosition::new(args.start_north, args.start_east, 0.0),
        &map.home,
    );
    let mut goal = goal_from_args(args.goal_lat, args.goal_lon, args.goal_north, args.goal_east);

    let plan = plan_mission(&map, &start, &mut goal, &config.planner)?;
    let output = RouteOutput {
        start: plan.start,
        goal: plan.goal,
        raw_cells: plan.raw_path.len(),
        nodes_expanded: plan.nodes_expanded,
        waypoints: plan.waypoints,
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");
    Ok(())
}

//! Tool configuration from environment.

use skyroute_core::{GeodeticPosition, GoalPosition, LocalPosition, PlannerConfig};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub colliders_path: PathBuf,
    pub planner: PlannerConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = PlannerConfig::default();
        Self {
            colliders_path: env::var("SKYROUTE_COLLIDERS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/colliders_sample.csv")),
            planner: PlannerConfig {
                cruise_altitude_m: env_f64("SKYROUTE_CRUISE_ALTITUDE")
                    .unwrap_or(defaults.cruise_altitude_m),
                safety_margin_m: env_f64("SKYROUTE_SAFETY_MARGIN")
                    .unwrap_or(defaults.safety_margin_m),
                vertical_move_cost: env_f64("SKYROUTE_VERTICAL_COST")
                    .unwrap_or(defaults.vertical_move_cost),
                ..defaults
            },
        }
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        colliders: Option<PathBuf>,
        cruise_altitude_m: Option<f64>,
        safety_margin_m: Option<f64>,
    ) -> Self {
        if let Some(path) = colliders {
            self.colliders_path = path;
        }
        if let Some(altitude) = cruise_altitude_m {
            self.planner.cruise_altitude_m = altitude;
        }
        if let Some(margin) = safety_margin_m {
            self.planner.safety_margin_m = margin;
        }
        self
    }
}

/// Goal from optional command-line coordinates. A local north/east pair wins over a
/// geodetic one; with neither, the built-in default goal is used.
pub fn goal_from_args(
    latitude: Option<f64>,
    longitude: Option<f64>,
    north: Option<f64>,
    east: Option<f64>,
) -> GoalPosition {
    match (north, east, latitude, longitude) {
        (Some(north), Some(east), _, _) => {
            GoalPosition::Local(LocalPosition::new(north, east, 0.0))
        }
        (_, _, Some(latitude), Some(longitude)) => {
            GoalPosition::Global(GeodeticPosition::new(latitude, longitude, 0.0))
        }
        _ => GoalPosition::default(),
    }
}

fn env_f64(key: &str) -> Option<f64> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

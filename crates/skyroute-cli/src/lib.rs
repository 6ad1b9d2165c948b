//! SkyRoute CLI - planning and simulation tools.
//!
//! Binaries:
//! - plan_route: plan a route over an obstacle file and print it as JSON
//! - fly_mission: fly a full mission against the kinematic simulator

pub mod config;
pub mod sim;

pub use config::{goal_from_args, Config};
pub use sim::SimVehicle;

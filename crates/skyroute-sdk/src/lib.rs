//! SkyRoute SDK - vehicle integration library
//!
//! Connects a vehicle to the flight-phase controller: commands leave through a
//! [`ChannelLink`], telemetry arrives through a [`TelemetryFeed`] and a
//! [`MissionRunner`] drives the mission.

pub mod link;
pub mod runner;
pub mod telemetry;

pub use link::ChannelLink;
pub use runner::{spawn_mission, MissionReport, MissionRunner, RunnerError};
pub use skyroute_core::{TelemetryEvent, VehicleCommand};
pub use telemetry::{decode_telemetry, TelemetryFeed};

//! Command interface to the vehicle.

use crate::models::{GeodeticPosition, Waypoint};
use serde::{Deserialize, Serialize};

/// Fire-and-forget command sink. Acknowledgment is inferred from later telemetry.
pub trait VehicleCommands {
    fn arm(&mut self);
    fn disarm(&mut self);
    fn acquire_control(&mut self);
    fn release_control(&mut self);
    fn takeoff(&mut self, altitude: f64);
    fn command_position(&mut self, north: f64, east: f64, altitude: f64, heading: f64);
    fn land(&mut self);
    fn set_home_position(&mut self, home: GeodeticPosition);

    /// Publish the full route once after planning. Links that cannot display it ignore it.
    fn send_waypoints(&mut self, _waypoints: &[Waypoint]) {}
}

/// Value form of a vehicle command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VehicleCommand {
    Arm,
    Disarm,
    AcquireControl,
    ReleaseControl,
    Takeoff { altitude: f64 },
    Position { north: f64, east: f64, altitude: f64, heading: f64 },
    Land,
    SetHome { home: GeodeticPosition },
    Waypoints { waypoints: Vec<Waypoint> },
}

impl VehicleCommand {
    /// Replay this command against any sink.
    pub fn apply_to(&self, vehicle: &mut dyn VehicleCommands) {
        match self {
            VehicleCommand::Arm => vehicle.arm(),
            VehicleCommand::Disarm => vehicle.disarm(),
            VehicleCommand::AcquireControl => vehicle.acquire_control(),
            VehicleCommand::ReleaseControl => vehicle.release_control(),
            VehicleCommand::Takeoff { altitude } => vehicle.takeoff(*altitude),
            VehicleCommand::Position {
                north,
                east,
                altitude,
                heading,
            } => vehicle.command_position(*north, *east, *altitude, *heading),
            VehicleCommand::Land => vehicle.land(),
            VehicleCommand::SetHome { home } => vehicle.set_home_position(*home),
            VehicleCommand::Waypoints { waypoints } => vehicle.send_waypoints(waypoints),
        }
    }
}

/// Recording sink.
impl VehicleCommands for Vec<VehicleCommand> {
    fn arm(&mut self) {
        self.push(VehicleCommand::Arm);
    }

    fn disarm(&mut self) {
        self.push(VehicleCommand::Disarm);
    }

    fn acquire_control(&mut self) {
        self.push(VehicleCommand::AcquireControl);
    }

    fn release_control(&mut self) {
        self.push(VehicleCommand::ReleaseControl);
    }

    fn takeoff(&mut self, altitude: f64) {
        self.push(VehicleCommand::Takeoff { altitude });
    }

    fn command_position(&mut self, north: f64, east: f64, altitude: f64, heading: f64) {
        self.push(VehicleCommand::Position {
            north,
            east,
            altitude,
            heading,
        });
    }

    fn land(&mut self) {
        self.push(VehicleCommand::Land);
    }

    fn set_home_position(&mut self, home: GeodeticPosition) {
        self.push(VehicleCommand::SetHome { home });
    }

    fn send_waypoints(&mut self, waypoints: &[Waypoint]) {
        self.push(VehicleCommand::Waypoints {
            waypoints: waypoints.to_vec(),
        });
    }
}

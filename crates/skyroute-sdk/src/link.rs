//! Command link to the vehicle over an unbounded channel.

use skyroute_core::{GeodeticPosition, VehicleCommand, VehicleCommands, Waypoint};
use tokio::sync::mpsc;

/// Fire-and-forget command sink. Sending never blocks the controller; commands sent
/// after the vehicle side hung up are dropped with a warning.
#[derive(Debug, Clone)]
pub struct ChannelLink {
    tx: mpsc::UnboundedSender<VehicleCommand>,
}

impl ChannelLink {
    /// Create a link and the receiver the vehicle side drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<VehicleCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, command: VehicleCommand) {
        tracing::debug!(?command, "Sending vehicle command");
        if let Err(err) = self.tx.send(command) {
            tracing::warn!(command = ?err.0, "Vehicle link closed, command dropped");
        }
    }
}

impl VehicleCommands for ChannelLink {
    fn arm(&mut self) {
        self.send(VehicleCommand::Arm);
    }

    fn disarm(&mut self) {
        self.send(VehicleCommand::Disarm);
    }

    fn acquire_control(&mut self) {
        self.send(VehicleCommand::AcquireControl);
    }

    fn release_control(&mut self) {
        self.send(VehicleCommand::ReleaseControl);
    }

    fn takeoff(&mut self, altitude: f64) {
        self.send(VehicleCommand::Takeoff { altitude });
    }

    fn command_position(&mut self, north: f64, east: f64, altitude: f64, heading: f64) {
        self.send(VehicleCommand::Position {
            north,
            east,
            altitude,
            heading,
        });
    }

    fn land(&mut self) {
        self.send(VehicleCommand::Land);
    }

    fn set_home_position(&mut self, home: GeodeticPosition) {
        self.send(VehicleCommand::SetHome { home });
    }

    fn send_waypoints(&mut self, waypoints: &[Waypoint]) {
        self.send(VehicleCommand::Waypoints {
            waypoints: waypoints.to_vec(),
        });
    }
}

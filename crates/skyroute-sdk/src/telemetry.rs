//! Telemetry streaming helpers.

use anyhow::{Context, Result};
use skyroute_core::{
    GeodeticPosition, LocalPosition, LocalVelocity, TelemetryEvent, VehicleStatus,
};
use tokio::sync::mpsc;

/// Number of telemetry events buffered between the vehicle and the runner.
pub const TELEMETRY_BUFFER: usize = 256;

/// Vehicle-side handle that feeds telemetry to a [`crate::MissionRunner`].
#[derive(Debug, Clone)]
pub struct TelemetryFeed {
    tx: mpsc::Sender<TelemetryEvent>,
}

impl TelemetryFeed {
    pub fn channel() -> (Self, mpsc::Receiver<TelemetryEvent>) {
        let (tx, rx) = mpsc::channel(TELEMETRY_BUFFER);
        (Self { tx }, rx)
    }

    pub async fn send(&self, event: TelemetryEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| anyhow::anyhow!("mission runner stopped"))
    }

    pub async fn send_local_position(&self, north: f64, east: f64, down: f64) -> Result<()> {
        self.send(TelemetryEvent::LocalPosition(LocalPosition::new(north, east, down)))
            .await
    }

    pub async fn send_local_velocity(&self, north: f64, east: f64, down: f64) -> Result<()> {
        self.send(TelemetryEvent::LocalVelocity(LocalVelocity::new(north, east, down)))
            .await
    }

    pub async fn send_global_position(
        &self,
        latitude: f64,
        longitude: f64,
        altitude: f64,
    ) -> Result<()> {
        self.send(TelemetryEvent::GlobalPosition(GeodeticPosition::new(
            latitude, longitude, altitude,
        )))
        .await
    }

    pub async fn send_status(&self, armed: bool, guided: bool) -> Result<()> {
        self.send(TelemetryEvent::Status(VehicleStatus { armed, guided }))
            .await
    }

    /// True once the runner has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Decode one JSON telemetry record, e.g. `{"kind":"status","armed":true,"guided":true}`.
pub fn decode_telemetry(line: &str) -> Result<TelemetryEvent> {
    serde_json::from_str(line.trim()).with_context(|| format!("invalid telemetry record: {line}"))
}

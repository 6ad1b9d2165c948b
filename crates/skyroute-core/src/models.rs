//! Core data models shared by the planner and the flight controller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geodetic position. Latitude/longitude in degrees, altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeodeticPosition {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

impl GeodeticPosition {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

/// Position in the local North-East-Down frame anchored at home, meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalPosition {
    pub north: f64,
    pub east: f64,
    pub down: f64,
}

impl LocalPosition {
    pub fn new(north: f64, east: f64, down: f64) -> Self {
        Self { north, east, down }
    }

    /// Height above home (positive up).
    pub fn altitude(&self) -> f64 {
        -self.down
    }
}

/// Velocity in the local NED frame, m/s.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalVelocity {
    pub north: f64,
    pub east: f64,
    pub down: f64,
}

impl LocalVelocity {
    pub fn new(north: f64, east: f64, down: f64) -> Self {
        Self { north, east, down }
    }

    pub fn horizontal_speed(&self) -> f64 {
        self.north.hypot(self.east)
    }
}

/// Arming and guided-mode status reported by the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VehicleStatus {
    pub armed: bool,
    pub guided: bool,
}

/// A single telemetry update delivered to the flight controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TelemetryEvent {
    LocalPosition(LocalPosition),
    LocalVelocity(LocalVelocity),
    GlobalPosition(GeodeticPosition),
    Status(VehicleStatus),
}

/// Axis-aligned obstacle: center and half-extents in the local frame, meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRecord {
    pub north: f64,
    pub east: f64,
    pub altitude: f64,
    pub half_north: f64,
    pub half_east: f64,
    pub half_altitude: f64,
}

impl ObstacleRecord {
    pub fn new(
        center: (f64, f64, f64),
        half_extents: (f64, f64, f64),
    ) -> Self {
        Self {
            north: center.0,
            east: center.1,
            altitude: center.2,
            half_north: half_extents.0,
            half_east: half_extents.1,
            half_altitude: half_extents.2,
        }
    }

    pub fn is_finite(&self) -> bool {
        [
            self.north,
            self.east,
            self.altitude,
            self.half_north,
            self.half_east,
            self.half_altitude,
        ]
        .iter()
        .all(|value| value.is_finite())
    }

    /// Altitude of the obstacle's top face.
    pub fn top(&self) -> f64 {
        self.altitude + self.half_altitude
    }
}

/// Grid index triple. North/east index the height map; altitude is a free layer in meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub north: i64,
    pub east: i64,
    pub altitude: i64,
}

impl GridCell {
    pub const fn new(north: i64, east: i64, altitude: i64) -> Self {
        Self {
            north,
            east,
            altitude,
        }
    }

    pub fn with_altitude(self, altitude: i64) -> Self {
        Self { altitude, ..self }
    }

    pub fn horizontal_distance(&self, other: &GridCell) -> f64 {
        ((self.north - other.north) as f64).hypot((self.east - other.east) as f64)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.north, self.east, self.altitude)
    }
}

/// Commanded target in the local frame. Heading in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Waypoint {
    pub north: f64,
    pub east: f64,
    pub altitude: f64,
    pub heading: f64,
}

impl Waypoint {
    pub fn new(north: f64, east: f64, altitude: f64, heading: f64) -> Self {
        Self {
            north,
            east,
            altitude,
            heading,
        }
    }
}

/// Mission goal, either geodetic or already in the local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum GoalPosition {
    Global(GeodeticPosition),
    Local(LocalPosition),
}

impl Default for GoalPosition {
    fn default() -> Self {
        GoalPosition::Global(GeodeticPosition::new(37.7962347, -122.40017151, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_event_serializes_with_kind_tag() {
        let event = TelemetryEvent::Status(VehicleStatus {
            armed: true,
            guided: false,
        });
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["kind"], "status");
        assert_eq!(json["armed"], true);

        let back: TelemetryEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn obstacle_top_adds_half_extent() {
        let obstacle = ObstacleRecord::new((0.0, 0.0, 10.0), (5.0, 5.0, 10.0));
        assert_eq!(obstacle.top(), 20.0);
        assert!(obstacle.is_finite());

        let broken = ObstacleRecord::new((f64::NAN, 0.0, 0.0), (1.0, 1.0, 1.0));
        assert!(!broken.is_finite());
    }

    #[test]
    fn horizontal_speed_ignores_vertical_component() {
        let velocity = LocalVelocity::new(3.0, 4.0, -10.0);
        assert!((velocity.horizontal_speed() - 5.0).abs() < 1e-12);
    }
}

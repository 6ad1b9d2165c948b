//! Planning parameters and flight-phase thresholds.

use serde::{Deserialize, Serialize};

/// Configuration for grid building, A* and path post-processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Nominal cruise and takeoff altitude in meters
    pub cruise_altitude_m: f64,
    /// Horizontal and vertical inflation applied to every obstacle
    pub safety_margin_m: f64,
    /// Cost of one altitude layer change (horizontal moves cost 1 or sqrt(2))
    pub vertical_move_cost: f64,
    /// Sampling step along shortcut segments, in cells
    pub sample_step: f64,
    /// Tolerance for the collinearity determinant
    pub collinearity_epsilon: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cruise_altitude_m: 5.0,
            safety_margin_m: 5.0,
            vertical_move_cost: 2.0,
            sample_step: 0.25,
            collinearity_epsilon: 1e-6,
        }
    }
}

/// Thresholds used by the flight-phase guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRules {
    /// Takeoff completes once altitude reaches this fraction of the target
    pub takeoff_altitude_fraction: f64,
    /// Horizontal distance to the target below which a waypoint counts as reached
    pub waypoint_horizontal_tolerance_m: f64,
    /// Vertical distance to the target below which a waypoint counts as reached
    pub waypoint_vertical_tolerance_m: f64,
    /// The final waypoint triggers landing only below this horizontal speed
    pub landing_speed_mps: f64,
    /// Global altitude above home below which the vehicle counts as landed
    pub landed_altitude_m: f64,
    /// Local down magnitude below which the vehicle counts as landed
    pub landed_down_m: f64,
}

impl Default for FlightRules {
    fn default() -> Self {
        Self {
            takeoff_altitude_fraction: 0.95,
            waypoint_horizontal_tolerance_m: 3.0,
            waypoint_vertical_tolerance_m: 2.0,
            landing_speed_mps: 1.0,
            landed_altitude_m: 0.1,
            landed_down_m: 0.01,
        }
    }
}

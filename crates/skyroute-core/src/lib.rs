pub mod colliders;
pub mod error;
pub mod flight;
pub mod grid;
pub mod models;
pub mod pipeline;
pub mod planner;
pub mod postprocess;
pub mod rules;
pub mod spatial;
pub mod vehicle;
pub mod waypoints;

pub use colliders::{load_colliders, parse_colliders, ObstacleMap};
pub use error::{ColliderError, MissionError, PlanningError};
pub use flight::{
    next_phase, FlightEvent, FlightPhase, FlightPhaseController, MissionState, TelemetrySnapshot,
    Transition,
};
pub use grid::{build_grid, Grid};
pub use models::{
    GeodeticPosition, GoalPosition, GridCell, LocalPosition, LocalVelocity, ObstacleRecord,
    TelemetryEvent, VehicleStatus, Waypoint,
};
pub use pipeline::{plan_mission, GoalResolver, MissionPlan};
pub use planner::{a_star, euclidean_heuristic, path_cost, SearchOutcome};
pub use postprocess::{collinear, process_path, prune_path, segment_is_clear, simplify_path};
pub use rules::{FlightRules, PlannerConfig};
pub use spatial::{
    global_to_local, great_circle_distance, grid_to_local, local_to_global, local_to_grid,
};
pub use vehicle::{VehicleCommand, VehicleCommands};
pub use waypoints::{grid_path_to_waypoints, path_to_waypoints};

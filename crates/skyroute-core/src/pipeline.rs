//! Planning pipeline: obstacles -> grid -> A* -> post-processing -> waypoints.

use crate::colliders::ObstacleMap;
use crate::error::PlanningError;
use crate::grid::{build_grid, Grid};
use crate::models::{GeodeticPosition, GoalPosition, GridCell, Waypoint};
use crate::planner::{a_star, euclidean_heuristic};
use crate::postprocess::process_path;
use crate::rules::PlannerConfig;
use crate::spatial::{global_to_local, great_circle_distance, local_to_global, local_to_grid};
use crate::waypoints::grid_path_to_waypoints;
use serde::{Deserialize, Serialize};

/// Supplies the mission goal once the grid is known.
///
/// Interactive goal pickers implement this as a closure over the grid; a fixed goal
/// is just a [`GoalPosition`].
pub trait GoalResolver {
    fn resolve_goal(&mut self, grid: &Grid, start: &GridCell) -> GoalPosition;
}

impl GoalResolver for GoalPosition {
    fn resolve_goal(&mut self, _grid: &Grid, _start: &GridCell) -> GoalPosition {
        *self
    }
}

impl<F> GoalResolver for F
where
    F: FnMut(&Grid, &GridCell) -> GoalPosition,
{
    fn resolve_goal(&mut self, grid: &Grid, start: &GridCell) -> GoalPosition {
        self(grid, start)
    }
}

/// Everything produced by one planning run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionPlan {
    pub grid: Grid,
    pub start: GridCell,
    pub goal: GridCell,
    pub raw_path: Vec<GridCell>,
    pub path: Vec<GridCell>,
    pub waypoints: Vec<Waypoint>,
    pub nodes_expanded: usize,
}

/// Lift an endpoint to a flyable layer: at least the cruise altitude, one meter above
/// its own height and one meter above the column under it.
fn lift_to_safe_altitude(grid: &Grid, cell: GridCell, cruise_altitude: f64) -> GridCell {
    let cruise = cruise_altitude.ceil().max(0.0) as i64;
    let mut altitude = cruise.max(cell.altitude + 1);
    if let Some(height) = grid.height(cell.north, cell.east) {
        altitude = altitude.max((height + 1.0).floor() as i64);
    }
    cell.with_altitude(altitude)
}

/// Run the whole planning pipeline for a vehicle currently at `current`.
pub fn plan_mission(
    map: &ObstacleMap,
    current: &GeodeticPosition,
    goal_resolver: &mut dyn GoalResolver,
    config: &PlannerConfig,
) -> Result<MissionPlan, PlanningError> {
    let grid = build_grid(&map.obstacles, config.safety_margin_m)?;
    let (north_offset, east_offset) = (grid.north_offset(), grid.east_offset());

    let local_start = global_to_local(current, &map.home);
    let start = lift_to_safe_altitude(
        &grid,
        local_to_grid(&local_start, north_offset, east_offset),
        config.cruise_altitude_m,
    );

    let (local_goal, global_goal) = match goal_resolver.resolve_goal(&grid, &start) {
        GoalPosition::Global(position) => (global_to_local(&position, &map.home), position),
        GoalPosition::Local(position) => (position, local_to_global(&position, &map.home)),
    };
    let goal = lift_to_safe_altitude(
        &grid,
        local_to_grid(&local_goal, north_offset, east_offset),
        config.cruise_altitude_m,
    );

    tracing::info!(
        %start,
        %goal,
        north_offset,
        east_offset,
        ground_distance_m = great_circle_distance(current, &global_goal),
        "Searching path"
    );

    let outcome = a_star(&grid, euclidean_heuristic, start, goal, config)?;
    let path = process_path(&grid, &outcome.path, config);
    let waypoints = grid_path_to_waypoints(&grid, &path);

    tracing::info!(
        waypoints = waypoints.len(),
        nodes_expanded = outcome.nodes_expanded,
        cost = outcome.cost,
        "Path found"
    );

    Ok(MissionPlan {
        grid,
        start,
        goal,
        raw_path: outcome.path,
        path,
        waypoints,
        nodes_expanded: outcome.nodes_expanded,
    })
}

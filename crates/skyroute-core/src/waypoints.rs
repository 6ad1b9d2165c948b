//! Conversion of a grid path into local-frame waypoints.

use crate::grid::Grid;
use crate::models::{GridCell, Waypoint};

/// Map each path cell to a waypoint. Heading points along the leg arriving at the
/// waypoint (atan2 of east over north); the first waypoint has heading 0.
pub fn path_to_waypoints(path: &[GridCell], north_offset: f64, east_offset: f64) -> Vec<Waypoint> {
    let mut waypoints = Vec::with_capacity(path.len());
    let mut previous: Option<&GridCell> = None;

    for cell in path {
        let heading = match previous {
            Some(prev) => ((cell.east - prev.east) as f64).atan2((cell.north - prev.north) as f64),
            None => 0.0,
        };
        waypoints.push(Waypoint {
            north: cell.north as f64 + north_offset,
            east: cell.east as f64 + east_offset,
            altitude: cell.altitude as f64,
            heading,
        });
        previous = Some(cell);
    }

    waypoints
}

/// Convenience wrapper using the grid's own offsets.
pub fn grid_path_to_waypoints(grid: &Grid, path: &[GridCell]) -> Vec<Waypoint> {
    path_to_waypoints(path, grid.north_offset(), grid.east_offset())
}

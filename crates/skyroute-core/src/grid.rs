//! 2.5D height-map grid built from obstacle boxes.
//!
//! Each cell stores the altitude a vehicle must exceed to be safe in that column:
//! the highest obstacle top intersecting the column, inflated by the safety margin.
//! Obstacles are dilated horizontally by the same margin before rasterization.

use crate::error::PlanningError;
use crate::models::{GridCell, ObstacleRecord};
use serde::{Deserialize, Serialize};

/// Largest height map `build_grid` will allocate (4 km x 4 km at one meter per cell).
pub const MAX_GRID_CELLS: usize = 16_000_000;

/// Immutable height map with its origin in the local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    north_size: usize,
    east_size: usize,
    heights: Vec<f64>,
    north_offset: f64,
    east_offset: f64,
}

impl Grid {
    /// Build a grid by evaluating `height` for every (north, east) index.
    ///
    /// Negative or non-finite heights are stored as 0.
    pub fn from_fn<F>(
        north_size: usize,
        east_size: usize,
        north_offset: f64,
        east_offset: f64,
        mut height: F,
    ) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut heights = Vec::with_capacity(north_size * east_size);
        for north in 0..north_size {
            for east in 0..east_size {
                let value = height(north, east);
                heights.push(if value.is_finite() { value.max(0.0) } else { 0.0 });
            }
        }
        Self {
            north_size,
            east_size,
            heights,
            north_offset,
            east_offset,
        }
    }

    /// Obstacle-free grid.
    pub fn empty(north_size: usize, east_size: usize, north_offset: f64, east_offset: f64) -> Self {
        Self::from_fn(north_size, east_size, north_offset, east_offset, |_, _| 0.0)
    }

    pub fn north_size(&self) -> usize {
        self.north_size
    }

    pub fn east_size(&self) -> usize {
        self.east_size
    }

    pub fn north_offset(&self) -> f64 {
        self.north_offset
    }

    pub fn east_offset(&self) -> f64 {
        self.east_offset
    }

    pub fn contains(&self, north: i64, east: i64) -> bool {
        north >= 0
            && east >= 0
            && (north as usize) < self.north_size
            && (east as usize) < self.east_size
    }

    /// Height of the column at (north, east), or `None` off the grid.
    pub fn height(&self, north: i64, east: i64) -> Option<f64> {
        if !self.contains(north, east) {
            return None;
        }
        Some(self.heights[north as usize * self.east_size + east as usize])
    }

    /// A cell is safe when it lies on the grid and its altitude exceeds the column height.
    pub fn is_safe(&self, cell: &GridCell) -> bool {
        self.is_safe_at(cell.north, cell.east, cell.altitude as f64)
    }

    pub fn is_safe_at(&self, north: i64, east: i64, altitude: f64) -> bool {
        self.height(north, east)
            .map(|height| altitude > height)
            .unwrap_or(false)
    }

    pub fn max_height(&self) -> f64 {
        self.heights.iter().copied().fold(0.0, f64::max)
    }

    fn raise(&mut self, north: usize, east: usize, value: f64) {
        let slot = &mut self.heights[north * self.east_size + east];
        if value > *slot {
            *slot = value;
        }
    }
}

/// Rasterize `obstacles` into a height map inflated by `safety_margin`.
///
/// Grid extents cover every inflated obstacle footprint; the returned grid's offsets
/// are the (floored) minimum north/east of that footprint.
pub fn build_grid(obstacles: &[ObstacleRecord], safety_margin: f64) -> Result<Grid, PlanningError> {
    if obstacles.is_empty() {
        return Err(PlanningError::MalformedObstacleData(
            "obstacle list is empty".to_string(),
        ));
    }
    if !safety_margin.is_finite() || safety_margin < 0.0 {
        return Err(PlanningError::MalformedObstacleData(format!(
            "safety margin must be finite and non-negative, got {safety_margin}"
        )));
    }
    for (idx, obstacle) in obstacles.iter().enumerate() {
        if !obstacle.is_finite() {
            return Err(PlanningError::MalformedObstacleData(format!(
                "obstacle {idx} has non-finite values"
            )));
        }
        if obstacle.half_north < 0.0 || obstacle.half_east < 0.0 || obstacle.half_altitude < 0.0 {
            return Err(PlanningError::MalformedObstacleData(format!(
                "obstacle {idx} has negative half-extents"
            )));
        }
    }

    let north_min = obstacles
        .iter()
        .map(|o| o.north - o.half_north - safety_margin)
        .fold(f64::INFINITY, f64::min)
        .floor();
    let north_max = obstacles
        .iter()
        .map(|o| o.north + o.half_north + safety_margin)
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil();
    let east_min = obstacles
        .iter()
        .map(|o| o.east - o.half_east - safety_margin)
        .fold(f64::INFINITY, f64::min)
        .floor();
    let east_max = obstacles
        .iter()
        .map(|o| o.east + o.half_east + safety_margin)
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil();

    // Float-to-usize casts saturate, so the product check below also catches extents
    // beyond the usize range.
    let north_size = ((north_max - north_min) as usize).max(1);
    let east_size = ((east_max - east_min) as usize).max(1);
    match north_size.checked_mul(east_size) {
        Some(cells) if cells <= MAX_GRID_CELLS => {}
        _ => {
            return Err(PlanningError::MalformedObstacleData(format!(
                "grid extent too large: {north_size} x {east_size} cells, limit {MAX_GRID_CELLS}"
            )));
        }
    }

    let mut grid = Grid::empty(north_size, east_size, north_min, east_min);

    let clip = |value: f64, size: usize| -> usize {
        value.floor().clamp(0.0, (size - 1) as f64) as usize
    };

    for obstacle in obstacles {
        let north_lo = clip(
            obstacle.north - obstacle.half_north - safety_margin - north_min,
            north_size,
        );
        let north_hi = clip(
            obstacle.north + obstacle.half_north + safety_margin - north_min,
            north_size,
        );
        let east_lo = clip(
            obstacle.east - obstacle.half_east - safety_margin - east_min,
            east_size,
        );
        let east_hi = clip(
            obstacle.east + obstacle.half_east + safety_margin - east_min,
            east_size,
        );
        let height = (obstacle.top() + safety_margin).max(0.0);

        for north in north_lo..=north_hi {
            for east in east_lo..=east_hi {
                grid.raise(north, east, height);
            }
        }
    }

    tracing::debug!(
        north_size,
        east_size,
        north_offset = north_min,
        east_offset = east_min,
        obstacles = obstacles.len(),
        "Built obstacle grid"
    );

    Ok(grid)
}

//! Error types for planning and mission execution.

use crate::models::GridCell;
use thiserror::Error;

/// Failures of the planning pipeline. All of them are fatal to the current mission.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    #[error("malformed obstacle data: {0}")]
    MalformedObstacleData(String),

    #[error("no path found from {start} to {goal}")]
    PathNotFound { start: GridCell, goal: GridCell },

    #[error("cell {cell} does not clear the local obstacle height {obstacle_height:.1} m")]
    UnsafeStartOrGoal { cell: GridCell, obstacle_height: f64 },
}

/// Errors raised while reading an obstacle (colliders) file.
#[derive(Debug, Error)]
pub enum ColliderError {
    #[error("failed to read obstacle file: {0}")]
    Io(#[from] std::io::Error),

    #[error("obstacle file is missing the `lat0 <deg>, lon0 <deg>` home header")]
    MissingHome,

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Errors surfaced by the flight-phase controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MissionError {
    #[error("mission aborted: {0}")]
    Planning(#[from] PlanningError),

    #[error("a mission is already running (phase {0})")]
    NotInManual(crate::flight::FlightPhase),
}

//! A* search over the 2.5D grid.
//!
//! Nodes are grid cells with an altitude layer. From a cell the search may move to
//! any of the 8 horizontal neighbors on the same layer or climb/descend one layer.
//! Horizontal moves cost their Euclidean length, layer changes cost
//! `PlannerConfig::vertical_move_cost` so level flight is preferred.
//!
//! Equal f-scores are popped in insertion order, which makes the result
//! deterministic for a given grid and endpoints.

use crate::error::PlanningError;
use crate::grid::Grid;
use crate::models::GridCell;
use crate::rules::PlannerConfig;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

const HORIZONTAL_MOVES: [(i64, i64, f64); 8] = [
    (-1, 0, 1.0),
    (1, 0, 1.0),
    (0, -1, 1.0),
    (0, 1, 1.0),
    (-1, -1, std::f64::consts::SQRT_2),
    (-1, 1, std::f64::consts::SQRT_2),
    (1, -1, std::f64::consts::SQRT_2),
    (1, 1, std::f64::consts::SQRT_2),
];

/// Straight-line horizontal distance to the goal. Admissible because every
/// horizontal move costs at least its length and vertical moves are never free.
pub fn euclidean_heuristic(cell: &GridCell, goal: &GridCell) -> f64 {
    cell.horizontal_distance(goal)
}

/// Result of a successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub path: Vec<GridCell>,
    pub cost: f64,
    pub nodes_expanded: usize,
}

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f_score: FloatOrd,
    sequence: u64,
    g_score: FloatOrd,
    cell: GridCell,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

/// Inclusive range of altitude layers the search may use.
///
/// Above the tallest column every layer is free, so climbing higher than one layer
/// over it never shortens a path. Bounding the layers keeps the search finite.
fn altitude_bounds(
    grid: &Grid,
    start: &GridCell,
    goal: &GridCell,
    cruise_altitude: f64,
) -> (i64, i64) {
    let cruise = cruise_altitude.ceil().max(0.0) as i64;
    let floor = cruise.min(start.altitude).min(goal.altitude).max(0);
    let ceiling = (grid.max_height().ceil() as i64 + 1)
        .max(start.altitude)
        .max(goal.altitude);
    (floor, ceiling)
}

fn check_endpoint(grid: &Grid, cell: &GridCell) -> Result<(), PlanningError> {
    match grid.height(cell.north, cell.east) {
        Some(height) if cell.altitude as f64 > height => Ok(()),
        Some(height) => Err(PlanningError::UnsafeStartOrGoal {
            cell: *cell,
            obstacle_height: height,
        }),
        // Off-grid endpoints are handled by the caller as unreachable.
        None => Ok(()),
    }
}

/// Find the minimum-cost path from `start` to `goal`.
///
/// Fails with [`PlanningError::PathNotFound`] when either endpoint is off the grid or
/// the frontier empties, and with [`PlanningError::UnsafeStartOrGoal`] when an
/// endpoint does not clear its column.
pub fn a_star<H>(
    grid: &Grid,
    heuristic: H,
    start: GridCell,
    goal: GridCell,
    config: &PlannerConfig,
) -> Result<SearchOutcome, PlanningError>
where
    H: Fn(&GridCell, &GridCell) -> f64,
{
    let not_found = PlanningError::PathNotFound { start, goal };
    if !grid.contains(start.north, start.east) || !grid.contains(goal.north, goal.east) {
        tracing::warn!(%start, %goal, "Start or goal lies outside the grid");
        return Err(not_found);
    }
    check_endpoint(grid, &start)?;
    check_endpoint(grid, &goal)?;

    let (min_alt, max_alt) = altitude_bounds(grid, &start, &goal, config.cruise_altitude_m);
    let vertical_cost = config.vertical_move_cost.max(0.0);

    let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();
    let mut closed_set: HashSet<GridCell> = HashSet::new();
    let mut g_score: HashMap<GridCell, f64> = HashMap::new();
    let mut came_from: HashMap<GridCell, GridCell> = HashMap::new();
    let mut sequence = 0u64;

    g_score.insert(start, 0.0);
    open_set.push(Reverse(OpenNode {
        f_score: FloatOrd(heuristic(&start, &goal)),
        sequence,
        g_score: FloatOrd(0.0),
        cell: start,
    }));

    let mut nodes_expanded = 0usize;
    let mut final_cost: Option<f64> = None;

    while let Some(Reverse(current)) = open_set.pop() {
        let cell = current.cell;
        if closed_set.contains(&cell) {
            continue;
        }
        let best_g = g_score.get(&cell).copied().unwrap_or(f64::INFINITY);
        if current.g_score.0 > best_g + 1e-9 {
            continue;
        }

        nodes_expanded += 1;

        if cell == goal {
            final_cost = Some(best_g);
            break;
        }

        closed_set.insert(cell);

        let horizontal = HORIZONTAL_MOVES
            .iter()
            .map(|&(dn, de, cost)| {
                let next = GridCell::new(cell.north + dn, cell.east + de, cell.altitude);
                (next, cost)
            });
        let vertical = [1i64, -1]
            .into_iter()
            .map(|da| (cell.with_altitude(cell.altitude + da), vertical_cost));

        for (next, step_cost) in horizontal.chain(vertical) {
            if next.altitude < min_alt || next.altitude > max_alt {
                continue;
            }
            if closed_set.contains(&next) {
                continue;
            }
            if next != goal && !grid.is_safe(&next) {
                continue;
            }

            let tentative_g = best_g + step_cost;
            if tentative_g < g_score.get(&next).copied().unwrap_or(f64::INFINITY) {
                came_from.insert(next, cell);
                g_score.insert(next, tentative_g);
                sequence += 1;
                open_set.push(Reverse(OpenNode {
                    f_score: FloatOrd(tentative_g + heuristic(&next, &goal)),
                    sequence,
                    g_score: FloatOrd(tentative_g),
                    cell: next,
                }));
            }
        }
    }

    let Some(cost) = final_cost else {
        tracing::warn!(%start, %goal, nodes_expanded, "A* frontier exhausted");
        return Err(not_found);
    };

    let mut path = vec![goal];
    let mut current = goal;
    while let Some(previous) = came_from.get(&current) {
        path.push(*previous);
        current = *previous;
    }
    path.reverse();

    tracing::debug!(
        %start,
        %goal,
        nodes_expanded,
        cost,
        cells = path.len(),
        "A* found path"
    );

    Ok(SearchOutcome {
        path,
        cost,
        nodes_expanded,
    })
}

/// Cost of `path` under the planner's move model.
pub fn path_cost(path: &[GridCell], vertical_move_cost: f64) -> f64 {
    path.windows(2)
        .map(|pair| {
            let horizontal = pair[0].horizontal_distance(&pair[1]);
            let vertical = (pair[1].altitude - pair[0].altitude).abs() as f64;
            horizontal + vertical * vertical_move_cost
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PlannerConfig {
        PlannerConfig::default()
    }

    #[test]
    fn straight_line_on_empty_grid() {
        let grid = Grid::empty(12, 12, 0.0, 0.0);
        let outcome = a_star(
            &grid,
            euclidean_heuristic,
            GridCell::new(0, 0, 5),
            GridCell::new(10, 10, 5),
            &config(),
        )
        .unwrap();
        assert_eq!(outcome.path.len(), 11);
        assert!((outcome.cost - 10.0 * std::f64::consts::SQRT_2).abs() < 1e-9);
        assert!(outcome.path.iter().all(|cell| cell.altitude == 5));
    }

    #[test]
    fn start_equal_to_goal_is_a_single_cell() {
        let grid = Grid::empty(4, 4, 0.0, 0.0);
        let cell = GridCell::new(2, 2, 5);
        let outcome = a_star(&grid, euclidean_heuristic, cell, cell, &config()).unwrap();
        assert_eq!(outcome.path, vec![cell]);
        assert_eq!(outcome.cost, 0.0);
    }

    #[test]
    fn off_grid_goal_is_not_found() {
        let grid = Grid::empty(10, 10, 0.0, 0.0);
        let err = a_star(
            &grid,
            euclidean_heuristic,
            GridCell::new(1, 1, 5),
            GridCell::new(-3, 4, 5),
            &config(),
        )
        .unwrap_err();
        assert!(matches!(err, PlanningError::PathNotFound { .. }));
    }

    #[test]
    fn buried_start_is_unsafe() {
        let grid = Grid::from_fn(5, 5, 0.0, 0.0, |_, _| 8.0);
        let err = a_star(
            &grid,
            euclidean_heuristic,
            GridCell::new(0, 0, 5),
            GridCell::new(4, 4, 9),
            &config(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PlanningError::UnsafeStartOrGoal {
                cell: GridCell::new(0, 0, 5),
                obstacle_height: 8.0,
            }
        );
    }

    #[test]
    fn climbs_over_wall_spanning_the_grid() {
        // A wall across the whole east axis forces a climb to layer 7.
        let grid = Grid::from_fn(9, 5, 0.0, 0.0, |n, _| if n == 4 { 6.0 } else { 0.0 });
        let outcome = a_star(
            &grid,
            euclidean_heuristic,
            GridCell::new(0, 2, 5),
            GridCell::new(8, 2, 5),
            &config(),
        )
        .unwrap();
        let crossing = outcome.path.iter().find(|cell| cell.north == 4).unwrap();
        assert_eq!(crossing.altitude, 7);
        // 8 horizontal steps plus 2 up and 2 down
        assert!((outcome.cost - (8.0 + 4.0 * 2.0)).abs() < 1e-9);
    }

    #[test]
    fn equal_cost_routes_resolve_identically() {
        let grid = Grid::from_fn(10, 10, 0.0, 0.0, |n, e| {
            if (3..6).contains(&n) && (3..6).contains(&e) {
                20.0
            } else {
                0.0
            }
        });
        let run = || {
            a_star(
                &grid,
                euclidean_heuristic,
                GridCell::new(0, 0, 5),
                GridCell::new(9, 9, 5),
                &config(),
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn path_cost_counts_layers() {
        let path = [
            GridCell::new(0, 0, 5),
            GridCell::new(0, 0, 6),
            GridCell::new(1, 1, 6),
        ];
        assert!((path_cost(&path, 2.0) - (2.0 + std::f64::consts::SQRT_2)).abs() < 1e-12);
    }
}

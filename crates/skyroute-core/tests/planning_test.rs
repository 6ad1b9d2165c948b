//! Planner integration tests.
//!
//! Randomized checks run on seeded grids so failures reproduce.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skyroute_core::{
    a_star, build_grid, euclidean_heuristic, path_cost, process_path, prune_path, collinear,
    segment_is_clear, Grid, GridCell, ObstacleRecord, PlannerConfig, PlanningError,
};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

const CRUISE: i64 = 5;

fn random_grid(rng: &mut StdRng, size: usize) -> Grid {
    Grid::from_fn(size, size, 0.0, 0.0, |_, _| {
        if rng.random_bool(0.3) {
            rng.random_range(3.0..12.0)
        } else {
            0.0
        }
    })
}

fn random_safe_cell(rng: &mut StdRng, grid: &Grid) -> Option<GridCell> {
    for _ in 0..50 {
        let cell = GridCell::new(
            rng.random_range(0..grid.north_size() as i64),
            rng.random_range(0..grid.east_size() as i64),
            CRUISE,
        );
        if grid.is_safe(&cell) {
            return Some(cell);
        }
    }
    None
}

/// Uniform-cost search over the same move model, used as ground truth.
fn dijkstra_cost(grid: &Grid, start: GridCell, goal: GridCell, vertical_cost: f64) -> Option<f64> {
    let floor = CRUISE.min(start.altitude).min(goal.altitude).max(0);
    let ceiling = (grid.max_height().ceil() as i64 + 1)
        .max(start.altitude)
        .max(goal.altitude);

    // Costs are multiples of {1, sqrt 2, vertical}; scale to integers for the heap key.
    let key = |cost: f64| (cost * 1e6).round() as i64;
    let mut best: HashMap<GridCell, f64> = HashMap::new();
    let mut heap = BinaryHeap::new();
    best.insert(start, 0.0);
    heap.push(Reverse((0i64, start)));

    while let Some(Reverse((_, cell))) = heap.pop() {
        let cost = best[&cell];
        if cell == goal {
            return Some(cost);
        }
        let mut moves = Vec::new();
        for dn in -1..=1 {
            for de in -1..=1 {
                if dn == 0 && de == 0 {
                    continue;
                }
                let step = if dn != 0 && de != 0 { std::f64::consts::SQRT_2 } else { 1.0 };
                moves.push((GridCell::new(cell.north + dn, cell.east + de, cell.altitude), step));
            }
        }
        moves.push((cell.with_altitude(cell.altitude + 1), vertical_cost));
        moves.push((cell.with_altitude(cell.altitude - 1), vertical_cost));

        for (next, step) in moves {
            if next.altitude < floor || next.altitude > ceiling || !grid.is_safe(&next) {
                continue;
            }
            let candidate = cost + step;
            if best.get(&next).map_or(true, |&known| candidate < known - 1e-12) {
                best.insert(next, candidate);
                heap.push(Reverse((key(candidate), next)));
            }
        }
    }
    None
}

fn is_legal_step(a: &GridCell, b: &GridCell) -> bool {
    let dn = (a.north - b.north).abs();
    let de = (a.east - b.east).abs();
    let da = (a.altitude - b.altitude).abs();
    (da == 0 && dn <= 1 && de <= 1 && dn + de > 0) || (da == 1 && dn == 0 && de == 0)
}

#[test]
fn a_star_matches_exhaustive_search() {
    let config = PlannerConfig::default();
    let mut rng = StdRng::seed_from_u64(7);
    let mut compared = 0;

    for _ in 0..40 {
        let size = rng.random_range(5..=20);
        let grid = random_grid(&mut rng, size);
        let (Some(start), Some(goal)) = (
            random_safe_cell(&mut rng, &grid),
            random_safe_cell(&mut rng, &grid),
        ) else {
            continue;
        };

        let expected = dijkstra_cost(&grid, start, goal, config.vertical_move_cost);
        let outcome = a_star(&grid, euclidean_heuristic, start, goal, &config);
        match (expected, outcome) {
            (Some(expected), Ok(outcome)) => {
                assert!(
                    (outcome.cost - expected).abs() < 1e-6,
                    "A* cost {} differs from optimum {expected} for {start} -> {goal}",
                    outcome.cost
                );
                let recomputed = path_cost(&outcome.path, config.vertical_move_cost);
                assert!((recomputed - outcome.cost).abs() < 1e-6);
                assert_eq!(outcome.path.first(), Some(&start));
                assert_eq!(outcome.path.last(), Some(&goal));
                for pair in outcome.path.windows(2) {
                    assert!(
                        is_legal_step(&pair[0], &pair[1]),
                        "illegal step {} -> {}",
                        pair[0],
                        pair[1]
                    );
                    assert!(grid.is_safe(&pair[1]));
                }
                compared += 1;
            }
            (None, Err(PlanningError::PathNotFound { .. })) => {}
            (expected, outcome) => panic!("disagreement: exhaustive {expected:?}, A* {outcome:?}"),
        }
    }
    assert!(compared > 10, "too few comparable cases: {compared}");
}

#[test]
fn larger_margin_never_lowers_a_column() {
    let mut rng = StdRng::seed_from_u64(42);
    let obstacles: Vec<ObstacleRecord> = (0..12)
        .map(|_| {
            ObstacleRecord::new(
                (
                    rng.random_range(-80.0..80.0),
                    rng.random_range(-80.0..80.0),
                    rng.random_range(2.0..40.0),
                ),
                (
                    rng.random_range(0.5..8.0),
                    rng.random_range(0.5..8.0),
                    rng.random_range(1.0..20.0),
                ),
            )
        })
        .collect();

    let small = build_grid(&obstacles, 1.0).unwrap();
    let large = build_grid(&obstacles, 4.0).unwrap();
    let shift_north = (small.north_offset() - large.north_offset()) as i64;
    let shift_east = (small.east_offset() - large.east_offset()) as i64;

    for north in 0..small.north_size() as i64 {
        for east in 0..small.east_size() as i64 {
            let before = small.height(north, east).unwrap();
            let after = large
                .height(north + shift_north, east + shift_east)
                .expect("larger margin must cover the smaller grid");
            assert!(after >= before, "column ({north}, {east}) dropped from {before} to {after}");
        }
    }
}

#[test]
fn post_processing_never_introduces_collisions() {
    let config = PlannerConfig::default();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..25 {
        let grid = random_grid(&mut rng, 16);
        let (Some(start), Some(goal)) = (
            random_safe_cell(&mut rng, &grid),
            random_safe_cell(&mut rng, &grid),
        ) else {
            continue;
        };
        let Ok(outcome) = a_star(&grid, euclidean_heuristic, start, goal, &config) else {
            continue;
        };

        let pruned = prune_path(&outcome.path, config.collinearity_epsilon);
        assert_eq!(pruned.first(), outcome.path.first());
        assert_eq!(pruned.last(), outcome.path.last());
        // Every dropped cell lies on the segment that replaced it.
        for pair in pruned.windows(2) {
            let from = outcome.path.iter().position(|c| *c == pair[0]).unwrap();
            let to = outcome.path.iter().position(|c| *c == pair[1]).unwrap();
            for dropped in &outcome.path[from + 1..to] {
                assert!(collinear(&pair[0], dropped, &pair[1], config.collinearity_epsilon));
            }
        }

        let processed = process_path(&grid, &outcome.path, &config);
        assert!(processed.len() <= pruned.len());
        assert_eq!(processed.first(), Some(&start));
        assert_eq!(processed.last(), Some(&goal));
        for pair in processed.windows(2) {
            // Adjacent survivors of pruning were never sampled; only shortcuts were.
            if pruned.windows(2).any(|p| p == pair) {
                continue;
            }
            assert!(segment_is_clear(&grid, &pair[0], &pair[1], config.sample_step));
        }
    }
}

#[test]
fn detours_around_single_inflated_block() {
    let obstacles = vec![
        ObstacleRecord::new((0.0, 0.0, 10.0), (5.0, 5.0, 10.0)),
        // Corner markers stretch the grid beyond the block.
        ObstacleRecord::new((-30.0, -30.0, 0.5), (0.5, 0.5, 0.5)),
        ObstacleRecord::new((30.0, 30.0, 0.5), (0.5, 0.5, 0.5)),
    ];
    let config = PlannerConfig::default();
    let grid = build_grid(&obstacles, config.safety_margin_m).unwrap();
    let to_cell = |north: f64, east: f64| {
        GridCell::new(
            (north - grid.north_offset()) as i64,
            (east - grid.east_offset()) as i64,
            CRUISE,
        )
    };
    let start = to_cell(-20.0, -20.0);
    let goal = to_cell(20.0, 20.0);

    let outcome = a_star(&grid, euclidean_heuristic, start, goal, &config).unwrap();
    assert!(outcome.path.iter().all(|cell| cell.altitude == CRUISE));
    assert!(outcome.cost > start.horizontal_distance(&goal) + 1.0);

    let processed = process_path(&grid, &outcome.path, &config);
    assert!(processed.len() >= 3, "straight diagonal crosses the block: {processed:?}");
}

#[test]
fn open_field_collapses_to_two_waypoints() {
    let grid = Grid::empty(20, 20, 0.0, 0.0);
    let config = PlannerConfig::default();
    let start = GridCell::new(0, 0, CRUISE);
    let goal = GridCell::new(10, 10, CRUISE);

    let outcome = a_star(&grid, euclidean_heuristic, start, goal, &config).unwrap();
    let processed = process_path(&grid, &outcome.path, &config);
    assert_eq!(processed, vec![start, goal]);
}

#[test]
fn negative_goal_index_is_not_found() {
    let grid = Grid::empty(20, 20, 0.0, 0.0);
    let err = a_star(
        &grid,
        euclidean_heuristic,
        GridCell::new(5, 5, CRUISE),
        GridCell::new(-1, 5, CRUISE),
        &PlannerConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PlanningError::PathNotFound { .. }));
}

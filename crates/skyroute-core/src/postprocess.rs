//! Path post-processing: collinearity pruning followed by shortcut simplification.

use crate::grid::Grid;
use crate::models::GridCell;
use crate::rules::PlannerConfig;

/// True when `p2` lies on the segment `p1 -> p3`.
///
/// The horizontal determinant is checked together with the two components involving
/// altitude, so a point where the climb rate changes is kept.
pub fn collinear(p1: &GridCell, p2: &GridCell, p3: &GridCell, epsilon: f64) -> bool {
    let u = (
        (p2.north - p1.north) as f64,
        (p2.east - p1.east) as f64,
        (p2.altitude - p1.altitude) as f64,
    );
    let v = (
        (p3.north - p1.north) as f64,
        (p3.east - p1.east) as f64,
        (p3.altitude - p1.altitude) as f64,
    );

    let det_horizontal = u.0 * v.1 - u.1 * v.0;
    let det_north_alt = u.0 * v.2 - u.2 * v.0;
    let det_east_alt = u.1 * v.2 - u.2 * v.1;
    if det_horizontal.abs() > epsilon
        || det_north_alt.abs() > epsilon
        || det_east_alt.abs() > epsilon
    {
        return false;
    }

    // p2 must sit between the endpoints, not beyond them.
    let dot = u.0 * v.0 + u.1 * v.1 + u.2 * v.2;
    let v_len2 = v.0 * v.0 + v.1 * v.1 + v.2 * v.2;
    dot >= -epsilon && dot <= v_len2 + epsilon
}

/// Remove intermediate points that lie on the segment between their neighbors.
///
/// Repeats until a full scan removes nothing. Endpoints are never removed.
pub fn prune_path(path: &[GridCell], epsilon: f64) -> Vec<GridCell> {
    let mut pruned = path.to_vec();
    loop {
        let mut removed = false;
        let mut idx = 0usize;
        while idx + 2 < pruned.len() {
            if collinear(&pruned[idx], &pruned[idx + 1], &pruned[idx + 2], epsilon) {
                pruned.remove(idx + 1);
                removed = true;
            } else {
                idx += 1;
            }
        }
        if !removed {
            break;
        }
    }
    pruned
}

/// Check the straight segment `start -> end` against the grid.
///
/// The segment is sampled every `sample_step` cells with the altitude interpolated
/// between the endpoints; each sample's nearest column must be on the grid and lower
/// than the sampled altitude. The endpoints themselves are not re-checked.
pub fn segment_is_clear(grid: &Grid, start: &GridCell, end: &GridCell, sample_step: f64) -> bool {
    let d_north = (end.north - start.north) as f64;
    let d_east = (end.east - start.east) as f64;
    let d_alt = (end.altitude - start.altitude) as f64;
    let length = (d_north * d_north + d_east * d_east + d_alt * d_alt).sqrt();

    let step = if sample_step.is_finite() && sample_step > 0.0 {
        sample_step
    } else {
        0.25
    };
    let samples = ((length / step).ceil() as usize).max(1);

    for i in 1..samples {
        let t = i as f64 / samples as f64;
        let north = (start.north as f64 + t * d_north).round() as i64;
        let east = (start.east as f64 + t * d_east).round() as i64;
        let altitude = start.altitude as f64 + t * d_alt;
        if !grid.is_safe_at(north, east, altitude) {
            return false;
        }
    }
    true
}

/// Greedy shortcutting: from each kept point jump to the farthest later point whose
/// segment is clear.
pub fn simplify_path(grid: &Grid, path: &[GridCell], sample_step: f64) -> Vec<GridCell> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut simplified = vec![path[0]];
    let mut current_idx = 0usize;

    while current_idx < path.len() - 1 {
        let current = &path[current_idx];
        let mut furthest_valid = current_idx + 1;

        for target_idx in (current_idx + 2)..path.len() {
            if segment_is_clear(grid, current, &path[target_idx], sample_step) {
                furthest_valid = target_idx;
            }
        }

        simplified.push(path[furthest_valid]);
        current_idx = furthest_valid;
    }

    simplified
}

/// Prune then simplify a raw search path.
pub fn process_path(grid: &Grid, raw: &[GridCell], config: &PlannerConfig) -> Vec<GridCell> {
    let pruned = prune_path(raw, config.collinearity_epsilon);
    let simplified = simplify_path(grid, &pruned, config.sample_step);
    tracing::debug!(
        raw = raw.len(),
        pruned = pruned.len(),
        simplified = simplified.len(),
        "Post-processed path"
    );
    simplified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(points: &[(i64, i64, i64)]) -> Vec<GridCell> {
        points.iter().map(|&(n, e, a)| GridCell::new(n, e, a)).collect()
    }

    #[test]
    fn straight_run_prunes_to_endpoints() {
        let path = cells(&[(0, 0, 5), (1, 1, 5), (2, 2, 5), (3, 3, 5)]);
        assert_eq!(prune_path(&path, 1e-6), cells(&[(0, 0, 5), (3, 3, 5)]));
    }

    #[test]
    fn corner_is_kept() {
        let path = cells(&[(0, 0, 5), (1, 0, 5), (2, 0, 5), (2, 1, 5), (2, 2, 5)]);
        assert_eq!(
            prune_path(&path, 1e-6),
            cells(&[(0, 0, 5), (2, 0, 5), (2, 2, 5)])
        );
    }

    #[test]
    fn climb_point_is_kept_even_when_horizontally_collinear() {
        let path = cells(&[(0, 0, 5), (0, 0, 6), (1, 0, 6), (2, 0, 6)]);
        let pruned = prune_path(&path, 1e-6);
        assert_eq!(pruned, cells(&[(0, 0, 5), (0, 0, 6), (2, 0, 6)]));
    }

    #[test]
    fn point_beyond_segment_is_not_collinear() {
        let a = GridCell::new(0, 0, 5);
        let b = GridCell::new(3, 0, 5);
        let c = GridCell::new(1, 0, 5);
        assert!(!collinear(&a, &b, &c, 1e-6));
        assert!(collinear(&a, &c, &b, 1e-6));
    }

    #[test]
    fn shortcut_through_column_is_rejected() {
        let grid = Grid::from_fn(6, 6, 0.0, 0.0, |n, e| if n == 2 && e == 2 { 10.0 } else { 0.0 });
        assert!(!segment_is_clear(&grid, &GridCell::new(0, 0, 5), &GridCell::new(4, 4, 5), 0.25));
        assert!(segment_is_clear(&grid, &GridCell::new(0, 0, 11), &GridCell::new(4, 4, 11), 0.25));
    }

    #[test]
    fn simplify_cuts_corner_when_clear() {
        let grid = Grid::empty(5, 5, 0.0, 0.0);
        let path = cells(&[(0, 0, 5), (4, 0, 5), (4, 4, 5)]);
        assert_eq!(simplify_path(&grid, &path, 0.25), cells(&[(0, 0, 5), (4, 4, 5)]));
    }

    #[test]
    fn simplify_keeps_corner_around_obstacle() {
        let grid = Grid::from_fn(5, 5, 0.0, 0.0, |n, e| if n == 2 && e == 2 { 10.0 } else { 0.0 });
        let path = cells(&[(0, 0, 5), (4, 0, 5), (4, 4, 5)]);
        assert_eq!(simplify_path(&grid, &path, 0.25), path);
    }
}

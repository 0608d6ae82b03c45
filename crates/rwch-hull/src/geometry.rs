//! Closed-polygon helpers shared by the 2-D algorithms.

use std::cmp::Ordering;

use rwch_core::{cross2d_z, Step};

/// Enclosed area of a closed polygon (first vertex repeated at the end).
///
/// `A = 1/2 sum (x_i - x_{i+1})(y_i + y_{i+1})`, positive for counterclockwise order.
pub fn polygon_area(closed: &[Step<f64>]) -> f64 {
    closed
        .windows(2)
        .map(|w| (w[0].x() - w[1].x()) * (w[0].y() + w[1].y()))
        .sum::<f64>()
        / 2.0
}

/// Perimeter of a closed polygon.
pub fn polygon_perimeter(closed: &[Step<f64>]) -> f64 {
    closed.windows(2).map(|w| w[0].dist(&w[1])).sum()
}

/// Orders points counterclockwise by angle around their centroid.
pub fn sort_by_angle(points: &mut [Step<f64>]) {
    if points.is_empty() {
        return;
    }
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x()).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y()).sum::<f64>() / n;
    points.sort_by(|a, b| {
        let ta = (a.y() - cy).atan2(a.x() - cx);
        let tb = (b.y() - cy).atan2(b.x() - cx);
        ta.partial_cmp(&tb).unwrap_or(Ordering::Equal)
    });
}

/// Drops vertices lying on the segment between their neighbours.
///
/// Operates on an open cycle (no repeated closing vertex).
pub fn prune_collinear(cycle: &mut Vec<Step<f64>>, eps: f64) {
    let mut changed = true;
    while changed && cycle.len() > 2 {
        changed = false;
        let n = cycle.len();
        for i in 0..n {
            let prev = &cycle[(i + n - 1) % n];
            let next = &cycle[(i + 1) % n];
            if cross2d_z(prev, &cycle[i], next).abs() <= eps {
                cycle.remove(i);
                changed = true;
                break;
            }
        }
    }
}

/// Rotates an open cycle to start at its lexicographically smallest vertex and closes it.
pub fn close_from_lowest(mut cycle: Vec<Step<f64>>) -> Vec<Step<f64>> {
    if let Some(start) = (0..cycle.len()).min_by(|&a, &b| cycle[a].lex_cmp(&cycle[b])) {
        cycle.rotate_left(start);
    }
    if let Some(first) = cycle.first().cloned() {
        cycle.push(first);
    }
    cycle
}

/// Largest absolute coordinate, at least 1. Used to scale tolerances.
pub fn coordinate_scale(points: &[Step<f64>]) -> f64 {
    points
        .iter()
        .flat_map(|p| p.as_slice().iter())
        .fold(1.0f64, |acc, c| acc.max(c.abs()))
}

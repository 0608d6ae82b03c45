//! Jarvis march (gift wrapping).

use rwch_core::{cross2d_z, Step};

/// Convex hull of 2-D points by gift wrapping, O(n h).
///
/// Starts at the lexicographically smallest point and always wraps to the
/// point with every other point on its left; among collinear candidates the
/// furthest one wins. The result is closed and counterclockwise.
pub fn jarvis(points: &[Step<f64>]) -> Vec<Step<f64>> {
    let Some(start) = points.iter().min_by(|a, b| a.lex_cmp(b)).cloned() else {
        return Vec::new();
    };

    let mut hull = vec![start.clone()];
    let mut current = start.clone();
    // each wrap adds one vertex, so more than n + 1 wraps means float trouble
    for _ in 0..=points.len() {
        let Some(mut candidate) = points.iter().find(|p| **p != current).cloned() else {
            hull.push(start.clone());
            return hull;
        };
        for p in points {
            if *p == current {
                continue;
            }
            let turn = cross2d_z(&current, &candidate, p);
            if turn < 0.0 || (turn == 0.0 && current.dist(p) > current.dist(&candidate)) {
                candidate = p.clone();
            }
        }
        hull.push(candidate.clone());
        if candidate == start {
            return hull;
        }
        current = candidate;
    }

    tracing::warn!(points = points.len(), "jarvis march did not close, closing forcibly");
    hull.push(start);
    hull
}

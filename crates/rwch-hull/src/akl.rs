//! Akl–Toussaint interior-point culling.

use itertools::Itertools;
use rwch_core::{cross2d_z, Step};

use crate::quickhull::{quickhull, PointSet};

/// Drops points that lie inside the octagon spanned by the extremes in x, y,
/// x + y and x - y. The extremes themselves are always kept.
pub fn cull_2d(points: &[Step<f64>]) -> Vec<Step<f64>> {
    if points.len() < 8 {
        return points.to_vec();
    }

    // counterclockwise from the leftmost point
    let mut octagon: Vec<usize> = [
        extreme(points, |p| p.x(), false),
        extreme(points, |p| p.x() + p.y(), false),
        extreme(points, |p| p.y(), false),
        extreme(points, |p| p.x() - p.y(), true),
        extreme(points, |p| p.x(), true),
        extreme(points, |p| p.x() + p.y(), true),
        extreme(points, |p| p.y(), true),
        extreme(points, |p| p.x() - p.y(), false),
    ]
    .into_iter()
    .dedup_by(|a, b| points[*a] == points[*b])
    .collect();
    while octagon.len() > 1 && points[octagon[0]] == points[octagon[octagon.len() - 1]] {
        octagon.pop();
    }
    if octagon.len() < 3 {
        return points.to_vec();
    }

    let edges: Vec<(usize, usize)> = octagon.iter().copied().circular_tuple_windows().collect();
    let mut kept: Vec<Step<f64>> = points
        .iter()
        .filter(|q| {
            !edges
                .iter()
                .all(|&(a, b)| cross2d_z(&points[a], &points[b], q) >= 0.0)
        })
        .cloned()
        .collect();
    kept.extend(octagon.iter().map(|&i| points[i].clone()));
    kept
}

/// Drops points strictly inside the polytope spanned by the extremes along
/// the six axis directions and the eight diagonals `(±1, ±1, ±1)`.
pub fn cull_3d(points: &[Step<f64>]) -> Vec<Step<f64>> {
    if points.len() < 16 {
        return points.to_vec();
    }

    let mut directions: Vec<[f64; 3]> = Vec::with_capacity(14);
    for axis in 0..3 {
        for sign in [1.0, -1.0] {
            let mut dir = [0.0; 3];
            dir[axis] = sign;
            directions.push(dir);
        }
    }
    for sx in [1.0, -1.0] {
        for sy in [1.0, -1.0] {
            for sz in [1.0, -1.0] {
                directions.push([sx, sy, sz]);
            }
        }
    }

    let extremes: Vec<usize> = directions
        .iter()
        .map(|dir| {
            (0..points.len())
                .max_by(|&a, &b| project(&points[a], dir).total_cmp(&project(&points[b], dir)))
                .unwrap_or(0)
        })
        .sorted_unstable()
        .dedup()
        .collect();
    if extremes.len() < 4 {
        return points.to_vec();
    }

    let coords: Vec<f64> = extremes
        .iter()
        .flat_map(|&i| points[i].as_slice().iter().copied())
        .collect();
    let Ok(polytope) = quickhull(PointSet::new(&coords, 3)) else {
        return points.to_vec();
    };

    points
        .iter()
        .enumerate()
        .filter(|(i, p)| {
            extremes.binary_search(i).is_ok()
                || polytope
                    .facets
                    .iter()
                    .any(|f| f.distance(p.as_slice()) >= -polytope.eps)
        })
        .map(|(_, p)| p.clone())
        .collect()
}

fn extreme(points: &[Step<f64>], key: impl Fn(&Step<f64>) -> f64, largest: bool) -> usize {
    let mut best = 0;
    let mut best_key = key(&points[0]);
    for (i, p) in points.iter().enumerate().skip(1) {
        let v = key(p);
        if (largest && v > best_key) || (!largest && v < best_key) {
            best = i;
            best_key = v;
        }
    }
    best
}

fn project(p: &Step<f64>, dir: &[f64; 3]) -> f64 {
    p.as_slice().iter().zip(dir).map(|(a, b)| a * b).sum()
}

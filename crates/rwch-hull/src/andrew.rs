//! Andrew's monotone chain.

use rwch_core::{cross2d_z, Step};

/// Convex hull of lexicographically sorted 2-D points.
///
/// Returns the hull counterclockwise, starting and ending at the smallest
/// point. Collinear points on hull edges are not reported.
pub fn andrew(sorted: &[Step<f64>]) -> Vec<Step<f64>> {
    match sorted.len() {
        0 => return Vec::new(),
        1 => return vec![sorted[0].clone(), sorted[0].clone()],
        _ => {}
    }

    let mut lower: Vec<Step<f64>> = Vec::with_capacity(sorted.len());
    for p in sorted {
        while lower.len() >= 2 && cross2d_z(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
        {
            lower.pop();
        }
        lower.push(p.clone());
    }

    let mut upper: Vec<Step<f64>> = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross2d_z(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
        {
            upper.pop();
        }
        upper.push(p.clone());
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    if let Some(first) = lower.first().cloned() {
        lower.push(first);
    }
    lower
}

//! Planar faces of a 3-D hull, fan-triangulated.

use rwch_core::Step;

use crate::andrew::andrew;
use crate::quickhull::{dot, KernelHull, PointSet};

/// Outward-oriented triangles covering the hull surface.
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    /// Triangles, counterclockwise seen from outside.
    pub triangles: Vec<[Step<f64>; 3]>,
    /// Indices of points that are corners of some face.
    pub corners: Vec<usize>,
    /// Total triangle area.
    pub area: f64,
}

struct PlanarFace {
    normal: Vec<f64>,
    offset: f64,
    vertices: Vec<usize>,
}

/// Merges coplanar kernel facets and fan-triangulates every resulting face.
pub fn triangulate(hull: &KernelHull, points: PointSet<'_>) -> Triangulation {
    let mut faces: Vec<PlanarFace> = Vec::new();
    for facet in &hull.facets {
        let same_plane = faces.iter_mut().find(|face| {
            dot(&face.normal, &facet.normal) > 1.0 - 1e-9 && (face.offset - facet.offset).abs() <= hull.eps
        });
        match same_plane {
            Some(face) => face.vertices.extend_from_slice(&facet.vertices),
            None => faces.push(PlanarFace {
                normal: facet.normal.clone(),
                offset: facet.offset,
                vertices: facet.vertices.clone(),
            }),
        }
    }

    let mut out = Triangulation::default();
    for mut face in faces {
        face.vertices.sort_unstable();
        face.vertices.dedup();
        let mut cycle = face_cycle(&face, points);
        if cycle.len() < 3 {
            continue;
        }

        let corner = |i: usize| Step::from_vec(points.point(i).to_vec());
        let (a, b, c) = (corner(cycle[0]), corner(cycle[1]), corner(cycle[2]));
        let winding = (&b - &a).cross3(&(&c - &a));
        if dot(winding.as_slice(), &face.normal) < 0.0 {
            cycle.reverse();
        }

        let anchor = corner(cycle[0]);
        for pair in cycle[1..].windows(2) {
            let (p, q) = (corner(pair[0]), corner(pair[1]));
            out.area += (&p - &anchor).cross3(&(&q - &anchor)).length() / 2.0;
            out.triangles.push([anchor.clone(), p, q]);
        }
        out.corners.extend_from_slice(&cycle);
    }
    out.corners.sort_unstable();
    out.corners.dedup();
    out
}

/// Corners of a planar face in cyclic order.
///
/// The face is projected onto the two axes other than the dominant normal
/// component and its convex hull there picks out the corners.
fn face_cycle(face: &PlanarFace, points: PointSet<'_>) -> Vec<usize> {
    let dropped = (0..3)
        .max_by(|&i, &j| face.normal[i].abs().total_cmp(&face.normal[j].abs()))
        .unwrap_or(2);
    let (u, v) = match dropped {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };

    let mut projected: Vec<(Step<f64>, usize)> = face
        .vertices
        .iter()
        .map(|&i| {
            let p = points.point(i);
            (Step::from_vec(vec![p[u], p[v]]), i)
        })
        .collect();
    projected.sort_by(|a, b| a.0.lex_cmp(&b.0));

    let sorted: Vec<Step<f64>> = projected.iter().map(|(p, _)| p.clone()).collect();
    let mut ring = andrew(&sorted);
    ring.pop();
    ring.iter()
        .filter_map(|corner| projected.iter().find(|(p, _)| p == corner).map(|(_, i)| *i))
        .collect()
}

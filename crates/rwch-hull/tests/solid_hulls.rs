use proptest::prelude::*;
use rwch_core::Step;
use rwch_hull::{quickhull, HullAlgorithm, HullEngine, HullOptions, HullShape, PointSet};

fn p(coords: &[f64]) -> Step<f64> {
    Step::from_vec(coords.to_vec())
}

fn cube_with_interior() -> Vec<Step<f64>> {
    let mut points = Vec::new();
    for x in [0.0, 1.0] {
        for y in [0.0, 1.0] {
            for z in [0.0, 1.0] {
                points.push(p(&[x, y, z]));
            }
        }
    }
    // face centres, edge midpoints and interior points
    points.push(p(&[0.5, 0.5, 0.0]));
    points.push(p(&[0.5, 0.0, 0.0]));
    points.push(p(&[0.5, 0.5, 0.5]));
    for k in 1..20 {
        let t = k as f64 / 20.0;
        points.push(p(&[t, 1.0 - t, 0.5]));
    }
    points
}

#[test]
fn cube_volume_surface_and_faces() {
    for cull in [false, true] {
        let hull = HullEngine::new(HullOptions::new(HullAlgorithm::Library).with_culling(cull))
            .compute(&cube_with_interior())
            .unwrap();
        assert_eq!(hull.shape(), HullShape::Full);
        assert!((hull.a() - 1.0).abs() < 1e-9, "A = {}", hull.a());
        assert!((hull.l() - 6.0).abs() < 1e-9, "L = {}", hull.l());
        assert_eq!(hull.num_vertices(), 8);
        assert_eq!(hull.faces().len(), 12);
    }
}

#[test]
fn triangles_face_outwards() {
    let points = cube_with_interior();
    let hull = HullEngine::default().compute(&points).unwrap();
    let centre = p(&[0.5, 0.5, 0.5]);
    for [a, b, c] in hull.faces() {
        let normal = (b - a).cross3(&(c - a));
        let outward = a - &centre;
        assert!(normal.dot(&outward) > 0.0, "inward triangle {a:?} {b:?} {c:?}");
    }
}

#[test]
fn tetrahedron_measures() {
    let points = vec![p(&[0.0, 0.0, 0.0]), p(&[1.0, 0.0, 0.0]), p(&[0.0, 1.0, 0.0]), p(&[0.0, 0.0, 1.0])];
    let hull = HullEngine::default().compute(&points).unwrap();
    assert!((hull.a() - 1.0 / 6.0).abs() < 1e-12);
    let expected = 1.5 + 3f64.sqrt() / 2.0;
    assert!((hull.l() - expected).abs() < 1e-12, "L = {}", hull.l());
}

#[test]
fn hypercube_in_four_dimensions() {
    let mut coords = Vec::new();
    for corner in 0..16u32 {
        for axis in 0..4 {
            coords.push(f64::from((corner >> axis) & 1));
        }
    }
    coords.extend([0.5, 0.5, 0.5, 0.5]);
    let hull = quickhull(PointSet::new(&coords, 4)).unwrap();
    assert!((hull.volume - 1.0).abs() < 1e-9, "V = {}", hull.volume);
    assert!((hull.surface - 8.0).abs() < 1e-9, "S = {}", hull.surface);
    assert_eq!(hull.vertices.len(), 16);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn culling_and_triangulation_are_consistent(
        raw in prop::collection::vec((-10i32..10, -10i32..10, -10i32..10), 20..120)
    ) {
        let points: Vec<Step<f64>> = raw
            .iter()
            .map(|&(x, y, z)| p(&[x as f64, y as f64, z as f64]))
            .collect();
        let plain = HullEngine::default().compute(&points).unwrap();
        let culled = HullEngine::new(HullOptions::default().with_culling(true)).compute(&points).unwrap();
        prop_assert!((plain.l() - culled.l()).abs() < 1e-6 * plain.l().max(1.0));
        prop_assert!((plain.a() - culled.a()).abs() < 1e-6 * plain.a().max(1.0));

        if plain.shape() == HullShape::Full {
            let coords: Vec<f64> = points.iter().flat_map(|q| q.as_slice().to_vec()).collect();
            let kernel = quickhull(PointSet::new(&coords, 3)).unwrap();
            prop_assert!((kernel.surface - plain.l()).abs() < 1e-6 * plain.l().max(1.0));
        }
    }
}

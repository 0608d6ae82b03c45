use rwch_core::Step;
use rwch_hull::{HullAlgorithm, HullEngine, HullOptions, HullShape};

fn p(coords: &[f64]) -> Step<f64> {
    Step::from_vec(coords.to_vec())
}

#[test]
fn straight_line_has_twice_its_length_as_perimeter() {
    let points: Vec<Step<f64>> = (0..=25).map(|i| p(&[i as f64, 3.0])).collect();
    for algorithm in [HullAlgorithm::Library, HullAlgorithm::Andrew, HullAlgorithm::Jarvis] {
        let hull = HullEngine::new(HullOptions::new(algorithm)).compute(&points).unwrap();
        assert_eq!(hull.l(), 50.0);
        assert_eq!(hull.a(), 0.0);
        assert_eq!(hull.shape(), HullShape::Flat { dropped: Some(1) });
        assert_eq!(hull.num_vertices(), 2);
    }
}

#[test]
fn tilted_line_is_measured_in_its_own_direction() {
    let points: Vec<Step<f64>> = (0..=10).map(|i| p(&[i as f64, i as f64])).collect();
    let hull = HullEngine::new(HullOptions::new(HullAlgorithm::Library)).compute(&points).unwrap();
    assert!((hull.l() - 20.0 * 2f64.sqrt()).abs() < 1e-9, "L = {}", hull.l());
    assert_eq!(hull.a(), 0.0);
    assert_eq!(hull.shape(), HullShape::Flat { dropped: None });

    let andrew = HullEngine::new(HullOptions::new(HullAlgorithm::Andrew)).compute(&points).unwrap();
    assert!((andrew.l() - hull.l()).abs() < 1e-9);
    assert_eq!(andrew.a(), 0.0);
}

#[test]
fn single_point_collapses() {
    let points = vec![p(&[1.0, 2.0, 3.0]); 5];
    let hull = HullEngine::default().compute(&points).unwrap();
    assert_eq!(hull.shape(), HullShape::Collapsed);
    assert_eq!((hull.l(), hull.a()), (0.0, 0.0));
}

#[test]
fn two_flat_axes_give_zero_observables() {
    let points: Vec<Step<f64>> = (0..8).map(|i| p(&[0.0, i as f64, 0.0])).collect();
    let hull = HullEngine::default().compute(&points).unwrap();
    assert_eq!(hull.shape(), HullShape::Collapsed);
    assert_eq!((hull.l(), hull.a()), (0.0, 0.0));
}

#[test]
fn flat_rectangle_in_three_dimensions_reports_its_area() {
    let points = vec![
        p(&[0.0, 0.0, 1.0]),
        p(&[2.0, 0.0, 1.0]),
        p(&[2.0, 3.0, 1.0]),
        p(&[0.0, 3.0, 1.0]),
        p(&[1.0, 1.0, 1.0]),
    ];
    let hull = HullEngine::default().compute(&points).unwrap();
    assert_eq!(hull.shape(), HullShape::Flat { dropped: Some(2) });
    assert!((hull.l() - 6.0).abs() < 1e-9, "L = {}", hull.l());
    assert_eq!(hull.a(), 0.0);
    assert_eq!(hull.num_vertices(), 4);
}

#[test]
fn tilted_plane_in_three_dimensions() {
    let points = vec![
        p(&[0.0, 0.0, 0.0]),
        p(&[1.0, 0.0, 1.0]),
        p(&[0.0, 1.0, 1.0]),
        p(&[1.0, 1.0, 2.0]),
    ];
    let hull = HullEngine::default().compute(&points).unwrap();
    assert_eq!(hull.shape(), HullShape::Flat { dropped: None });
    assert!((hull.l() - 3f64.sqrt()).abs() < 1e-9, "L = {}", hull.l());
    assert_eq!(hull.a(), 0.0);
}

#[test]
fn planar_algorithms_reject_other_dimensions() {
    let points = vec![p(&[0.0, 0.0, 0.0]), p(&[1.0, 0.0, 0.0]), p(&[0.0, 1.0, 0.0]), p(&[0.0, 0.0, 1.0])];
    for algorithm in [HullAlgorithm::Andrew, HullAlgorithm::Jarvis] {
        let err = HullEngine::new(HullOptions::new(algorithm)).compute(&points).unwrap_err();
        assert!(!err.is_configuration());
        assert_eq!(err.info().code, "hull-dimension");
        assert!(err.to_string().contains("dimension 3"), "{err}");
    }
}

#[test]
fn culling_rejects_four_dimensions() {
    let points = vec![p(&[0.0; 4]), p(&[1.0, 0.0, 0.0, 0.0])];
    let err = HullEngine::new(HullOptions::new(HullAlgorithm::Library).with_culling(true))
        .compute(&points)
        .unwrap_err();
    assert_eq!(err.info().code, "hull-culling-dimension");
}

#[test]
fn unit_square_in_three_dimensions_has_unit_surface() {
    let points = vec![p(&[0.0, 0.0, 0.0]), p(&[1.0, 0.0, 0.0]), p(&[1.0, 1.0, 0.0]), p(&[0.0, 1.0, 0.0])];
    for culling in [false, true] {
        let hull = HullEngine::new(HullOptions::new(HullAlgorithm::Library).with_culling(culling))
            .compute(&points)
            .unwrap();
        assert!((hull.l() - 1.0).abs() < 1e-12, "L = {}", hull.l());
        assert_eq!(hull.a(), 0.0);
    }
}

#[test]
fn flat_slab_in_four_dimensions_reports_its_volume() {
    let mut points = Vec::new();
    for x in [0.0, 2.0] {
        for y in [0.0, 1.0] {
            for w in [0.0, 3.0] {
                points.push(p(&[x, y, 5.0, w]));
            }
        }
    }
    let hull = HullEngine::default().compute(&points).unwrap();
    assert_eq!(hull.shape(), HullShape::Flat { dropped: Some(2) });
    assert!((hull.l() - 6.0).abs() < 1e-9, "L = {}", hull.l());
    assert_eq!(hull.a(), 0.0);
}

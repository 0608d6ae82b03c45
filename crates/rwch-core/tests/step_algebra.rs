use proptest::prelude::*;
use rwch_core::{cross2d_z, Step};

#[test]
fn lattice_mapping_covers_all_directions() {
    let d = 3;
    let expected = [
        (0.05, vec![1, 0, 0]),
        (0.25, vec![-1, 0, 0]),
        (0.40, vec![0, 1, 0]),
        (0.60, vec![0, -1, 0]),
        (0.70, vec![0, 0, 1]),
        (0.99, vec![0, 0, -1]),
    ];
    for (u, coords) in expected {
        assert_eq!(Step::<i64>::lattice(d, u), Step::from_vec(coords), "u = {u}");
    }
}

#[test]
fn arithmetic_and_norms() {
    let a = Step::from_vec(vec![3.0, 4.0]);
    let b = Step::from_vec(vec![1.0, 1.0]);
    assert_eq!((&a - &b).as_slice(), &[2.0, 3.0]);
    assert_eq!((&a + &b).as_slice(), &[4.0, 5.0]);
    assert_eq!((-&b).as_slice(), &[-1.0, -1.0]);
    assert_eq!(a.length(), 5.0);
    assert_eq!(a.dot(&b), 7.0);
    assert!((a.dist(&b) - 13f64.sqrt()).abs() < 1e-12);
}

#[test]
fn orientation_sign_follows_turn_direction() {
    let o = Step::from_vec(vec![0i64, 0]);
    let x = Step::from_vec(vec![1i64, 0]);
    let y = Step::from_vec(vec![0i64, 1]);
    assert!(cross2d_z(&o, &x, &y) > 0.0);
    assert!(cross2d_z(&o, &y, &x) < 0.0);
    assert_eq!(cross2d_z(&o, &x, &Step::from_vec(vec![2, 0])), 0.0);
}

#[test]
fn cross3_is_orthogonal() {
    let a = Step::from_vec(vec![1.0, 2.0, 3.0]);
    let b = Step::from_vec(vec![-2.0, 0.5, 1.0]);
    let c = a.cross3(&b);
    assert!(c.dot(&a).abs() < 1e-12);
    assert!(c.dot(&b).abs() < 1e-12);
}

proptest! {
    #[test]
    fn lattice_uniform_inverts_lattice(d in 2usize..6, u in 0.0f64..1.0) {
        let step = Step::<i64>::lattice(d, u);
        prop_assert_eq!(step.length(), 1.0);
        let canonical = step.lattice_uniform().unwrap();
        prop_assert_eq!(Step::<i64>::lattice(d, canonical), step);
    }

    #[test]
    fn lexicographic_order_matches_integer_order(a in prop::collection::vec(-5i64..5, 3), b in prop::collection::vec(-5i64..5, 3)) {
        let sa = Step::from_vec(a);
        let sb = Step::from_vec(b);
        prop_assert_eq!(sa.cmp(&sb), sa.lex_cmp(&sb));
    }
}

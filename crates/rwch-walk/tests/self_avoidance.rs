use std::collections::HashSet;

use rwch_core::{RngHandle, Step};
use rwch_hull::HullOptions;
use rwch_walk::self_avoiding::{dimerize, overlaps};
use rwch_walk::{ChangeOutcome, Walk, WalkKind, WalkParams};

fn sites(walk: &Walk) -> HashSet<Step<i64>> {
    walk.trace()
        .iter()
        .map(|p| Step::from_vec(p.as_slice().iter().map(|c| *c as i64).collect()))
        .collect()
}

#[test]
fn dimerization_yields_self_avoiding_walks() {
    let mut rng = RngHandle::from_seed(17);
    for (d, n) in [(2, 7), (2, 64), (3, 100)] {
        let steps = dimerize(d, n, &mut rng);
        assert_eq!(steps.len(), n);
        assert!(!overlaps(&steps), "d = {d}, n = {n}");
        assert!(steps.iter().all(|s| s.as_slice().iter().map(|c| c.abs()).sum::<i64>() == 1));
    }
}

#[test]
fn overlap_detection() {
    let e = Step::from_vec(vec![1i64, 0]);
    let w = Step::from_vec(vec![-1i64, 0]);
    assert!(overlaps(&[e.clone(), w]));
    assert!(!overlaps(&[e.clone(), e]));
}

#[test]
fn pivots_and_step_changes_keep_the_walk_self_avoiding() {
    for d in [2, 3] {
        let mut walk = Walk::new(&WalkParams::new(WalkKind::SelfAvoiding, d, 80), HullOptions::default(), 2).unwrap();
        let mut rng = RngHandle::from_seed(99);
        let mut outcomes = [0usize; 3];
        for _ in 0..2000 {
            let outcome = walk.change(&mut rng);
            outcomes[outcome as usize] += 1;
            assert_eq!(sites(&walk).len(), 81, "d = {d}");
        }
        assert!(outcomes[ChangeOutcome::Applied as usize] > 0);
        assert!(outcomes[ChangeOutcome::Rejected as usize] > 0);
    }
}

#[test]
fn rejected_proposals_leave_nothing_to_undo() {
    let mut walk = Walk::new(&WalkParams::new(WalkKind::SelfAvoiding, 2, 60), HullOptions::default(), 5).unwrap();
    let mut rng = RngHandle::from_seed(6);
    for _ in 0..500 {
        let trace = walk.trace().to_vec();
        if walk.change(&mut rng) != ChangeOutcome::Applied {
            assert_eq!(walk.trace(), trace.as_slice());
            walk.undo_change();
            assert_eq!(walk.trace(), trace.as_slice());
        }
    }
}

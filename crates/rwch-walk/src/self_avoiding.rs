//! Self-avoiding walks: dimerization and pivot/single-step proposals.

use std::collections::HashSet;

use rwch_core::{RngHandle, Step};

use crate::pivot::Symmetry;
use crate::walk::{ChangeOutcome, Walk};

const NAIVE_LIMIT: usize = 10;
const PIVOT_THRESHOLD: f64 = 0.8;

/// Whether the walk made of `steps` from the origin visits a site twice.
pub fn overlaps(steps: &[Step<i64>]) -> bool {
    let d = steps.first().map_or(0, Step::dim);
    let mut position = Step::zero(d);
    let mut seen: HashSet<Step<i64>> = HashSet::with_capacity(steps.len() + 1);
    seen.insert(position.clone());
    steps.iter().any(|step| {
        position += step;
        !seen.insert(position.clone())
    })
}

/// Draws a self-avoiding walk of `n` steps by dimerization.
///
/// Short walks are grown step by step without immediate reversals and retried
/// until they avoid themselves; longer walks concatenate two independently
/// dimerized halves and retry until the joint walk avoids itself.
pub fn dimerize(d: usize, n: usize, rng: &mut RngHandle) -> Vec<Step<i64>> {
    if n <= NAIVE_LIMIT {
        loop {
            let steps = grow_without_reversal(d, n, rng);
            if !overlaps(&steps) {
                return steps;
            }
        }
    }
    loop {
        let mut steps = dimerize(d, n / 2, rng);
        steps.extend(dimerize(d, n - n / 2, rng));
        if !overlaps(&steps) {
            return steps;
        }
    }
}

fn grow_without_reversal(d: usize, n: usize, rng: &mut RngHandle) -> Vec<Step<i64>> {
    let mut steps: Vec<Step<i64>> = Vec::with_capacity(n);
    while steps.len() < n {
        let step = Step::<i64>::lattice(d, rng.uniform());
        if steps.last().map_or(true, |prev| &step + prev != Step::zero(d)) {
            steps.push(step);
        }
    }
    steps
}

pub(crate) fn lattice_point(p: &Step<f64>) -> Step<i64> {
    Step::from_vec(p.as_slice().iter().map(|c| c.round() as i64).collect())
}

impl Walk {
    pub(crate) fn change_self_avoiding(&mut self, rng: &mut RngHandle) -> ChangeOutcome {
        let idx = rng.index(self.params.steps);
        if rng.uniform() > PIVOT_THRESHOLD {
            self.pivot(idx, rng)
        } else {
            self.replace_step(idx, rng)
        }
    }

    /// Applies a random lattice symmetry to every step from `idx` on.
    fn pivot(&mut self, idx: usize, rng: &mut RngHandle) -> ChangeOutcome {
        let symmetries = Symmetry::all(self.params.dimension);
        let symmetry = symmetries[rng.index(symmetries.len())];
        let old: Vec<Step<i64>> = self.steps[idx..].iter().map(lattice_point).collect();
        let new: Vec<Step<i64>> = old.iter().map(|s| symmetry.apply(s)).collect();

        if new == old {
            self.drop_pending();
            return ChangeOutcome::Unchanged;
        }
        if !self.suffix_avoids(idx, &new) {
            self.drop_pending();
            return ChangeOutcome::Rejected;
        }

        let n = self.params.steps;
        self.begin_change(idx, n - idx, idx);
        for (slot, step) in self.latent[idx..].iter_mut().zip(&new) {
            *slot = step.lattice_uniform().unwrap_or(*slot);
        }
        self.recompute_from(idx);
        ChangeOutcome::Applied
    }

    /// Redraws step `idx`, keeping the rest of the walk in place.
    fn replace_step(&mut self, idx: usize, rng: &mut RngHandle) -> ChangeOutcome {
        let d = self.params.dimension;
        let u = rng.uniform();
        let step = Step::<i64>::lattice(d, u);
        if step == lattice_point(&self.steps[idx]) {
            self.drop_pending();
            return ChangeOutcome::Unchanged;
        }

        let mut suffix: Vec<Step<i64>> = self.steps[idx..].iter().map(lattice_point).collect();
        suffix[0] = step;
        if !self.suffix_avoids(idx, &suffix) {
            self.drop_pending();
            return ChangeOutcome::Rejected;
        }

        self.begin_change(idx, 1, idx);
        self.latent[idx] = u;
        self.recompute_from(idx);
        ChangeOutcome::Applied
    }

    /// Dry run: would replacing the steps from `idx` on by `suffix` keep the walk self-avoiding?
    fn suffix_avoids(&self, idx: usize, suffix: &[Step<i64>]) -> bool {
        let mut occupied: HashSet<Step<i64>> = self.trace[..=idx].iter().map(lattice_point).collect();
        let mut position = lattice_point(&self.trace[idx]);
        suffix.iter().all(|step| {
            position += step;
            occupied.insert(position.clone())
        })
    }
}

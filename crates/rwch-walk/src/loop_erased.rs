//! Chronological loop erasure of lattice walks.

use std::collections::HashMap;

use rwch_core::{RngHandle, Step};

/// Loop-erases the lattice walk encoded by `latent` until `n` steps survive.
///
/// Whenever the raw walk returns to a site already on the erased path, the
/// loop closed there is cut out. If the latent numbers run out first, the
/// vector is doubled with fresh uniforms from `rng`. Returns the surviving
/// steps and the number of latent values consumed.
pub fn erase(d: usize, n: usize, latent: &mut Vec<f64>, rng: &mut RngHandle) -> (Vec<Step<i64>>, usize) {
    let mut path: Vec<Step<i64>> = Vec::with_capacity(n + 1);
    let mut index: HashMap<Step<i64>, usize> = HashMap::with_capacity(n + 1);
    path.push(Step::zero(d));
    index.insert(Step::zero(d), 0);

    let mut consumed = 0;
    while path.len() < n + 1 {
        if consumed == latent.len() {
            let extra = latent.len().max(n);
            latent.extend((0..extra).map(|_| rng.uniform()));
        }
        let step = Step::<i64>::lattice(d, latent[consumed]);
        consumed += 1;

        let next = &path[path.len() - 1] + &step;
        match index.get(&next) {
            Some(&j) => {
                for site in path.drain(j + 1..) {
                    index.remove(&site);
                }
            }
            None => {
                index.insert(next.clone(), path.len());
                path.push(next);
            }
        }
    }

    let steps = path.windows(2).map(|w| &w[1] - &w[0]).collect();
    (steps, consumed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(axis: usize, positive: bool, d: usize) -> f64 {
        (axis as f64 + if positive { 0.25 } else { 0.75 }) / d as f64
    }

    #[test]
    fn immediate_reversal_is_erased() {
        let mut latent = vec![u(0, true, 2), u(0, false, 2), u(1, true, 2), u(1, true, 2)];
        let mut rng = RngHandle::from_seed(1);
        let (steps, consumed) = erase(2, 2, &mut latent, &mut rng);
        assert_eq!(consumed, 4);
        assert_eq!(steps, vec![Step::from_vec(vec![0, 1]), Step::from_vec(vec![0, 1])]);
    }

    #[test]
    fn square_loop_is_cut_out() {
        // east, north, west, south closes a square at the origin
        let mut latent = vec![
            u(0, true, 2),
            u(1, true, 2),
            u(0, false, 2),
            u(1, false, 2),
            u(0, false, 2),
            u(0, false, 2),
            u(0, false, 2),
            u(0, false, 2),
        ];
        let mut rng = RngHandle::from_seed(1);
        let (steps, consumed) = erase(2, 4, &mut latent, &mut rng);
        assert_eq!(consumed, 8);
        assert_eq!(steps, vec![Step::from_vec(vec![-1, 0]); 4]);
    }

    #[test]
    fn grows_latent_when_exhausted() {
        let mut latent = vec![u(0, true, 2)];
        let mut rng = RngHandle::from_seed(9);
        let (steps, consumed) = erase(2, 20, &mut latent, &mut rng);
        assert_eq!(steps.len(), 20);
        assert!(latent.len() >= consumed);
        assert!(consumed >= 20);
    }
}

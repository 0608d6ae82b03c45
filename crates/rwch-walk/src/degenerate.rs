//! Extremal walk constructions and a greedy downhill search.
//!
//! Samplers seed equilibration probes and energy-range bounds from these
//! shapes. Lattice kinds have closed forms; continuous kinds start from an
//! analytic guess and are polished by [`Walk::go_downhill`].

use std::f64::consts::PI;

use rwch_core::RngHandle;
use serde::{Deserialize, Serialize};

use crate::kind::WalkKind;
use crate::observable::Observable;
use crate::walk::Walk;

/// Changes without improvement after which [`Walk::go_downhill`] stops.
pub const DEFAULT_STAGNATION: usize = 1000;

/// Extremal shape to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Construction {
    /// Largest hull volume.
    MaxVolume,
    /// Largest hull surface.
    MaxSurface,
    /// Smallest hull volume.
    MinVolume,
    /// Smallest hull surface.
    MinSurface,
}

impl Construction {
    /// Construction reaching the largest (`maximize`) or smallest value of `observable`.
    ///
    /// Passage times have no closed-form extremes and fall back to the volume shapes.
    pub fn extreme(observable: Observable, maximize: bool) -> Construction {
        match (observable, maximize) {
            (Observable::Surface, true) => Construction::MaxSurface,
            (Observable::Surface, false) => Construction::MinSurface,
            (_, true) => Construction::MaxVolume,
            (_, false) => Construction::MinVolume,
        }
    }
}

fn l_shape(len: usize, legs: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.99 / ((legs * (i + 1)) as f64 / len as f64).ceil())
        .collect()
}

impl Walk {
    /// Replaces the walk by the extremal shape `which`.
    ///
    /// `rng` feeds the downhill polish of continuous kinds.
    pub fn degenerate(&mut self, which: Construction, rng: &mut RngHandle) {
        let (kind, d, n) = (self.params.kind, self.params.dimension, self.params.steps);
        let len = n * kind.arity(d);
        let (latent, polish) = match kind {
            WalkKind::Lattice | WalkKind::SelfAvoiding | WalkKind::LoopErased => {
                let latent = match which {
                    Construction::MaxVolume => l_shape(n, d),
                    Construction::MaxSurface => l_shape(n, d - 1),
                    Construction::MinVolume => vec![0.99; n],
                    // back and forth along the last axis; self-avoiding kinds cannot fold
                    Construction::MinSurface if kind == WalkKind::Lattice => (0..n)
                        .map(|i| if i % 2 == 1 { 0.99 } else { 0.99 - 0.5 / d as f64 })
                        .collect(),
                    Construction::MinSurface => vec![0.99; n],
                };
                (latent, None)
            }
            WalkKind::Real => match which {
                Construction::MaxVolume => (
                    (0..len).map(|k| 0.5 / (k / (d - 1) + 1) as f64).collect(),
                    Some((true, Observable::Volume)),
                ),
                Construction::MaxSurface if d == 2 => (vec![0.99; len], Some((true, Observable::Surface))),
                Construction::MaxSurface => (l_shape(len, d - 1), Some((true, Observable::Surface))),
                Construction::MinVolume => (vec![0.99; len], None),
                Construction::MinSurface => (l_shape(len, d - 1), Some((false, Observable::Surface))),
            },
            WalkKind::Gauss => match which {
                Construction::MaxVolume => {
                    let radius = 2.0;
                    let mut latent = vec![0.0; len];
                    for i in 0..n {
                        let theta = PI / (i + 1) as f64;
                        latent[i * d] = radius * theta.sin();
                        latent[i * d + 1] = radius * theta.cos();
                        for j in 2..d {
                            latent[i * d + j] = if i < n / 2 { 0.0 } else { radius };
                        }
                    }
                    (latent, Some((true, Observable::Volume)))
                }
                Construction::MaxSurface => (vec![2.0; len], Some((true, Observable::Surface))),
                Construction::MinVolume | Construction::MinSurface => (vec![0.0; len], None),
            },
        };

        self.set_latent(latent);
        if let Some((maximize, observable)) = polish {
            self.go_downhill(maximize, observable, rng, DEFAULT_STAGNATION);
        }
        tracing::debug!(kind = kind.name(), ?which, l = self.l(), a = self.a(), "degenerate construction");
    }

    /// Greedy search: keeps only changes that move `observable` in the wanted
    /// direction, in blocks of `stagnate` proposals, until a whole block gains
    /// less than `1e-5`.
    pub fn go_downhill(&mut self, maximize: bool, observable: Observable, rng: &mut RngHandle, stagnate: usize) {
        loop {
            let block_start = observable.evaluate(self);
            for _ in 0..stagnate {
                let old = observable.evaluate(self);
                self.change(rng);
                let new = observable.evaluate(self);
                if maximize ^ (new > old) {
                    self.undo_change();
                }
            }
            let now = observable.evaluate(self);
            let stalled = if maximize {
                now <= block_start + 1e-5
            } else {
                now >= block_start - 1e-5
            };
            if stalled || now.is_nan() {
                break;
            }
        }
    }
}

//! The walk: latent vector, steps, trace and a lazily rebuilt hull.

use rwch_core::{RngHandle, RwchError, Step};
use rwch_hull::{ConvexHull, HullEngine, HullOptions};

use crate::kind::{WalkKind, WalkParams};
use crate::loop_erased;
use crate::self_avoiding;

/// Validity of the cached hull.
#[derive(Debug, Clone, PartialEq)]
pub enum HullState {
    /// The hull matches the current trace.
    Clean(ConvexHull),
    /// The trace changed from step `since` on; the hull is rebuilt on the next read.
    Stale {
        /// First step whose position moved.
        since: usize,
    },
}

impl HullState {
    /// Whether a rebuild is due.
    pub fn is_stale(&self) -> bool {
        matches!(self, HullState::Stale { .. })
    }
}

/// What a call to [`Walk::change`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The latent vector changed and the trace was updated.
    Applied,
    /// The proposal left every step as it was.
    Unchanged,
    /// The proposal would have broken self-avoidance and was dropped.
    Rejected,
}

#[derive(Debug, Clone)]
struct PendingChange {
    start: usize,
    saved: Vec<f64>,
    old_len: usize,
    prev_hull: HullState,
}

/// A random walk of fixed kind, dimension and length.
///
/// The walk owns its latent numbers, the derived steps and trace, its own
/// hull engine and the RNG stream used for fresh realizations. Monte-Carlo
/// proposals draw from a caller-supplied RNG so that realization and
/// proposal streams stay independent.
#[derive(Debug, Clone)]
pub struct Walk {
    pub(crate) params: WalkParams,
    pub(crate) latent: Vec<f64>,
    pub(crate) steps: Vec<Step<f64>>,
    pub(crate) trace: Vec<Step<f64>>,
    pub(crate) consumed: usize,
    pub(crate) rng: RngHandle,
    engine: HullEngine,
    hull: HullState,
    pending: Option<PendingChange>,
}

impl Walk {
    /// Draws a fresh walk from the realization `seed`.
    pub fn new(params: &WalkParams, hull: HullOptions, seed: u64) -> Result<Self, RwchError> {
        params.validate()?;
        hull.check(params.dimension)?;
        let mut walk = Self {
            params: params.clone(),
            latent: Vec::new(),
            steps: Vec::new(),
            trace: Vec::new(),
            consumed: 0,
            rng: RngHandle::from_seed(seed),
            engine: HullEngine::new(hull),
            hull: HullState::Stale { since: 0 },
            pending: None,
        };
        walk.reconstruct();
        Ok(walk)
    }

    /// Walk parameters.
    pub fn params(&self) -> &WalkParams {
        &self.params
    }

    /// Walk kind.
    pub fn kind(&self) -> WalkKind {
        self.params.kind
    }

    /// Spatial dimension.
    pub fn dimension(&self) -> usize {
        self.params.dimension
    }

    /// Number of steps.
    pub fn num_steps(&self) -> usize {
        self.params.steps
    }

    /// Hull options used by this walk's engine.
    pub fn hull_options(&self) -> HullOptions {
        self.engine.options()
    }

    /// Latent numbers the steps are derived from.
    pub fn latent(&self) -> &[f64] {
        &self.latent
    }

    /// Steps, one per latent slice.
    pub fn steps(&self) -> &[Step<f64>] {
        &self.steps
    }

    /// Positions, `steps + 1` of them, starting at the origin.
    pub fn trace(&self) -> &[Step<f64>] {
        &self.trace
    }

    /// State of the cached hull.
    pub fn hull_state(&self) -> &HullState {
        &self.hull
    }

    /// Replaces the walk by a fresh independent realization.
    pub fn reconstruct(&mut self) {
        let (kind, d, n) = (self.params.kind, self.params.dimension, self.params.steps);
        self.latent = match kind {
            WalkKind::SelfAvoiding => self_avoiding::dimerize(d, n, &mut self.rng)
                .iter()
                .map(|s| s.lattice_uniform().unwrap_or_default())
                .collect(),
            _ => (0..n * kind.arity(d)).map(|_| kind.draw(&mut self.rng)).collect(),
        };
        self.rebuild();
    }

    /// Installs `latent` and rebuilds everything derived from it.
    pub(crate) fn set_latent(&mut self, latent: Vec<f64>) {
        self.latent = latent;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.pending = None;
        if self.params.kind == WalkKind::LoopErased {
            self.erase_loops();
        } else {
            self.recompute_from(0);
        }
        self.hull = HullState::Stale { since: 0 };
    }

    /// Re-derives steps `first..` and the trace behind them.
    pub(crate) fn recompute_from(&mut self, first: usize) {
        let (kind, d, n) = (self.params.kind, self.params.dimension, self.params.steps);
        let arity = kind.arity(d);
        if self.steps.len() != n || self.trace.len() != n + 1 {
            self.steps = vec![Step::zero(d); n];
            self.trace = vec![Step::zero(d); n + 1];
            return self.recompute_from(0);
        }
        for i in first..n {
            self.steps[i] = kind.step(d, &self.latent[i * arity..(i + 1) * arity]);
            let next = &self.trace[i] + &self.steps[i];
            self.trace[i + 1] = next;
        }
    }

    fn erase_loops(&mut self) {
        let (d, n) = (self.params.dimension, self.params.steps);
        let (steps, consumed) = loop_erased::erase(d, n, &mut self.latent, &mut self.rng);
        self.consumed = consumed;
        self.steps = steps.iter().map(Step::to_f64).collect();
        self.trace = Vec::with_capacity(n + 1);
        let mut position = Step::zero(d);
        self.trace.push(position.clone());
        for step in &self.steps {
            position += step;
            self.trace.push(position.clone());
        }
    }

    /// Proposes a random mutation.
    ///
    /// Exactly one change can be pending; a new call implicitly accepts the
    /// previous one. The hull is marked stale and rebuilt when next read.
    pub fn change(&mut self, rng: &mut RngHandle) -> ChangeOutcome {
        let (kind, d, n) = (self.params.kind, self.params.dimension, self.params.steps);
        match kind {
            WalkKind::SelfAvoiding => self.change_self_avoiding(rng),
            WalkKind::LoopErased => {
                let idx = rng.index(self.consumed.max(1));
                self.begin_change(idx, 1, 0);
                self.latent[idx] = rng.uniform();
                self.erase_loops();
                ChangeOutcome::Applied
            }
            _ => {
                let arity = kind.arity(d);
                let idx = rng.index(n);
                self.begin_change(idx * arity, arity, idx);
                for slot in &mut self.latent[idx * arity..(idx + 1) * arity] {
                    *slot = kind.draw(rng);
                }
                self.recompute_from(idx);
                ChangeOutcome::Applied
            }
        }
    }

    /// Reverts the pending change, restoring latent numbers, trace and hull
    /// bit for bit. Without a pending change this does nothing.
    pub fn undo_change(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.latent.truncate(pending.old_len);
        self.latent[pending.start..pending.start + pending.saved.len()].copy_from_slice(&pending.saved);
        if self.params.kind == WalkKind::LoopErased {
            self.erase_loops();
        } else {
            self.recompute_from(pending.start / self.params.kind.arity(self.params.dimension));
        }
        self.hull = pending.prev_hull;
    }

    /// Saves `len` latent numbers from `start` and invalidates the hull.
    pub(crate) fn begin_change(&mut self, start: usize, len: usize, since: usize) {
        let prev_hull = std::mem::replace(&mut self.hull, HullState::Stale { since });
        self.pending = Some(PendingChange {
            start,
            saved: self.latent[start..start + len].to_vec(),
            old_len: self.latent.len(),
            prev_hull,
        });
    }

    /// Forgets the pending change; used when a proposal turned out to be a no-op.
    pub(crate) fn drop_pending(&mut self) {
        self.pending = None;
    }

    fn refresh_hull(&mut self) {
        if self.hull.is_stale() {
            let hull = self.engine.compute(&self.trace).unwrap_or_else(|err| {
                tracing::warn!(%err, kind = self.params.kind.name(), "hull computation failed");
                ConvexHull::undefined(self.params.dimension)
            });
            self.hull = HullState::Clean(hull);
        }
    }

    /// Current hull, rebuilt if stale.
    pub fn hull(&mut self) -> Option<&ConvexHull> {
        self.refresh_hull();
        match &self.hull {
            HullState::Clean(hull) => Some(hull),
            HullState::Stale { .. } => None,
        }
    }

    /// Hull vertices; a closed polygon in 2-D.
    pub fn hull_vertices(&mut self) -> &[Step<f64>] {
        match self.hull() {
            Some(hull) => hull.vertices(),
            None => &[],
        }
    }

    /// Surface measure of the hull (perimeter in 2-D).
    pub fn l(&mut self) -> f64 {
        self.hull().map_or(f64::NAN, ConvexHull::l)
    }

    /// Enclosed measure of the hull (area in 2-D).
    pub fn a(&mut self) -> f64 {
        self.hull().map_or(f64::NAN, ConvexHull::a)
    }
}

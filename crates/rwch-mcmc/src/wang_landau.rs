//! Flat-histogram Wang-Landau estimation of the density of states.
//!
//! The observable range is split at the configured borders into ranges that
//! reach `overlap` bins into their neighbours. Every (iteration, range) pair
//! is an independent unit of work with its own walk and RNG stream, so the
//! estimates do not depend on the number of worker threads.

use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;
use rwch_core::{ErrorInfo, LogContext, RngHandle, RwchError};
use rwch_walk::{Construction, Observable, Walk};

use crate::config::{Method, RunConfig};
use crate::determinism;
use crate::dispatch::{prepare_walk, thread_pool};
use crate::histogram::{DensityOfStates, Histogram};
use crate::output::DataWriter;
use crate::stats::{Counters, Means};
use crate::summary::{DensityRecord, RunSummary};

/// Times the start search may redraw the walk before the unit is given up.
pub const MAX_RESTARTS: usize = 16;

/// Smallest and largest value `observable` can take on walks like `walk`.
///
/// The upper bound is read off the maximal construction; the lower bound is
/// the trivial minimum of the observable.
pub fn energy_bounds(walk: &Walk, observable: Observable, rng: &mut RngHandle) -> (f64, f64) {
    let n = walk.num_steps() as f64;
    let lower = match observable {
        Observable::Volume => 0.0,
        Observable::Surface if walk.kind().is_lattice() => 2.0,
        Observable::Surface => 4.0 * n.sqrt(),
        Observable::Passage { .. } => -1.0,
    };
    let upper = match observable {
        Observable::Passage { .. } => n,
        _ => {
            let mut extreme = walk.clone();
            extreme.degenerate(Construction::extreme(observable, true), rng);
            observable.evaluate(&mut extreme)
        }
    };
    (lower, upper)
}

/// Bin borders of every range: `bins` equal bins between consecutive
/// `borders`, extended by `overlap` bins of the same width into each
/// neighbouring range.
pub fn range_borders(borders: &[f64], bins: usize, overlap: usize) -> Vec<Vec<f64>> {
    let last = borders.len().saturating_sub(2);
    borders
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let width = (w[1] - w[0]) / bins as f64;
            let below = if i > 0 { overlap } else { 0 };
            let above = if i < last { overlap } else { 0 };
            let mut range: Vec<f64> = (0..=below + bins + above)
                .map(|k| w[0] + (k as f64 - below as f64) * width)
                .collect();
            range[below] = w[0];
            range[below + bins] = w[1];
            range
        })
        .collect()
}

/// Outcome of [`find_start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartSearch {
    /// The walk ended inside the target interval.
    pub found: bool,
    /// Proposals spent over all attempts.
    pub tries: u64,
    /// Fresh realizations drawn after the budget ran out.
    pub restarts: usize,
}

/// Moves `walk` into `[lower, upper]` by keeping only proposals that do not
/// move `observable` further away from the interval.
///
/// After `budget` proposals without success the walk is redrawn; after
/// [`MAX_RESTARTS`] redraws the search gives up.
pub fn find_start(
    walk: &mut Walk,
    rng: &mut RngHandle,
    observable: Observable,
    (lower, upper): (f64, f64),
    budget: u64,
    log: &LogContext,
) -> StartSearch {
    let mut search = StartSearch {
        found: false,
        tries: 0,
        restarts: 0,
    };
    let mut spent = 0u64;
    loop {
        let old = observable.evaluate(walk);
        if old >= lower && old <= upper {
            search.found = true;
            return search;
        }
        if spent >= budget {
            if search.restarts >= MAX_RESTARTS {
                log.warn(format_args!(
                    "no start in [{lower}, {upper}] after {} restarts",
                    search.restarts
                ));
                return search;
            }
            log.warn(format_args!(
                "start search for [{lower}, {upper}] stuck at {old} after {spent} proposals, redrawing the walk"
            ));
            walk.reconstruct();
            search.restarts += 1;
            spent = 0;
            continue;
        }
        walk.change(rng);
        let new = observable.evaluate(walk);
        if (new < lower && new < old) || (new > upper && new > old) {
            walk.undo_change();
        }
        spent += 1;
        search.tries += 1;
    }
}

/// State of one Wang-Landau unit of work.
#[derive(Debug)]
pub(crate) struct Unit {
    pub(crate) walk: Walk,
    pub(crate) rng: RngHandle,
    pub(crate) g: DensityOfStates,
    pub(crate) energy: f64,
    pub(crate) counters: Counters,
}

impl Unit {
    /// One change trial weighted by `1 / g`; returns the energy after the trial.
    ///
    /// Proposals leaving the range are always undone.
    pub(crate) fn trial(&mut self, observable: Observable) -> f64 {
        self.walk.change(&mut self.rng);
        self.counters.tries += 1;
        let new = observable.evaluate(&mut self.walk);
        if !self.g.contains(new) || self.g.acceptance(self.energy, new) < self.rng.uniform() {
            self.walk.undo_change();
            self.counters.rejections += 1;
        } else {
            self.energy = new;
        }
        self.energy
    }

    /// `trials` trials, each adding `lnf` to `g` and a visit to `visits` at the current energy.
    pub(crate) fn refine(&mut self, observable: Observable, trials: usize, lnf: f64, visits: &mut Histogram) {
        for _ in 0..trials {
            let s = self.trial(observable);
            self.g.add(s, lnf);
            visits.add(s, 1.0);
        }
    }
}

/// Flatness-driven refinement: `ln f` starts at one and is halved every time
/// the visit histogram becomes flat, until it drops to `lnf_min`.
fn flat_histogram(unit: &mut Unit, config: &RunConfig, log: &LogContext) {
    let wl = &config.wang_landau;
    let sweep = config.sweep_len();
    let _span = tracing::debug_span!("flat_histogram", lnf_min = wl.lnf_min).entered();
    let mut visits = Histogram::from_borders(unit.g.borders().to_vec());
    let mut lnf = 1.0;
    let mut stage = 0;
    while lnf > wl.lnf_min {
        let mut trials = 0u64;
        loop {
            unit.refine(config.observable, sweep, lnf, &mut visits);
            trials += sweep as u64;
            if visits.is_flat(wl.flatness) {
                break;
            }
            if trials >= wl.stage_trial_cap {
                log.warn(format_args!(
                    "stage {stage} not flat after {trials} trials (min {} mean {:.2}), refining anyway",
                    visits.min(),
                    visits.mean()
                ));
                break;
            }
        }
        log.debug(format_args!("stage {stage} done: lnf = {lnf:e}, {trials} trials"));
        tracing::trace!(stage, lnf, trials, energy = unit.energy, "refinement stage");
        visits.reset();
        lnf /= 2.0;
        stage += 1;
    }
}

struct UnitResult {
    record: DensityRecord,
    counters: Counters,
    latent: Vec<f64>,
}

/// Runs every (iteration, range) unit on the worker pool with `sample` as the
/// refinement schedule and writes the estimates in unit order.
pub(crate) fn run_units<F>(
    config: &RunConfig,
    log: &LogContext,
    method: Method,
    sample: F,
) -> Result<RunSummary, RwchError>
where
    F: Fn(&mut Unit, &RunConfig, &LogContext) + Sync,
{
    let reference = prepare_walk(config, 0)?;
    let borders = if config.wang_landau.borders.is_empty() {
        let mut rng = determinism::probe_rng(config.seeds.monte_carlo, 0);
        let (lower, upper) = energy_bounds(&reference, config.observable, &mut rng);
        log.info(format_args!("derived energy range [{lower}, {upper}]"));
        vec![lower, upper]
    } else {
        config.wang_landau.borders.clone()
    };
    if borders.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(RwchError::Configuration(
            ErrorInfo::new("wang-landau-range", "energy range is empty")
                .with_context("borders", format!("{borders:?}")),
        ));
    }
    let ranges = range_borders(&borders, config.wang_landau.bins, config.wang_landau.overlap);
    let jobs: Vec<(usize, usize)> = (0..config.iterations)
        .flat_map(|iteration| (0..ranges.len()).map(move |range| (iteration, range)))
        .collect();

    let started = Instant::now();
    let pool = thread_pool(config.parallel)?;
    let results: Result<Vec<_>, RwchError> = pool.install(|| {
        jobs.par_iter()
            .enumerate()
            .map(|(index, &(iteration, range))| -> Result<(usize, UnitResult), RwchError> {
                let unit_log = log.child(method.name(), index);
                let walk = prepare_walk(config, index)?;
                let mut unit = Unit {
                    walk,
                    rng: determinism::monte_carlo_rng(config.seeds.monte_carlo, index),
                    g: DensityOfStates::from_borders(ranges[range].clone()),
                    energy: 0.0,
                    counters: Counters::default(),
                };
                let bounds = (unit.g.borders()[0], unit.g.borders()[unit.g.borders().len() - 1]);
                let search = find_start(
                    &mut unit.walk,
                    &mut unit.rng,
                    config.observable,
                    bounds,
                    config.wang_landau.start_budget,
                    &unit_log,
                );
                if search.found {
                    unit.energy = config.observable.evaluate(&mut unit.walk);
                    unit_log.in_scope(|| sample(&mut unit, config, &unit_log));
                } else {
                    unit_log.warn(format_args!("range {range} skipped in iteration {iteration}"));
                }
                Ok((
                    index,
                    UnitResult {
                        record: DensityRecord {
                            iteration,
                            range,
                            borders: unit.g.borders().to_vec(),
                            log_density: unit.g.log_density().to_vec(),
                        },
                        counters: unit.counters,
                        latent: unit.walk.latent().to_vec(),
                    },
                ))
            })
            .collect()
    });
    let mut ordered = results?;
    ordered.sort_by_key(|(index, _)| *index);

    let mut out = DataWriter::create(config.output.data_paths.first().map(PathBuf::as_path))?;
    out.header(
        &format!(
            "{} density of states of {} with steps={}",
            method.name(),
            config.observable.name(),
            config.walk.steps
        ),
        "per unit: bin centers, then ln g",
    )?;
    let mut counters = Counters::default();
    let mut densities = Vec::with_capacity(ordered.len());
    for (_, result) in &ordered {
        let g = DensityOfStates::from_borders(result.record.borders.clone());
        out.comment(&format!(
            "iteration {} range {}",
            result.record.iteration, result.record.range
        ))?;
        out.values(&g.centers())?;
        out.values(&result.record.log_density)?;
        counters.merge(&result.counters);
        densities.push(result.record.clone());
    }
    out.footer(&counters, ordered.len(), started.elapsed())?;
    log.info(format_args!(
        "{} finished: {} units, acceptance {:.4}",
        method.name(),
        ordered.len(),
        counters.acceptance()
    ));

    let latent = ordered
        .first()
        .map(|(_, result)| result.latent.as_slice())
        .unwrap_or(reference.latent());
    let mut summary = RunSummary::new(method, config.observable, counters, &Means::default(), latent);
    summary.densities = densities;
    Ok(summary)
}

/// Wang-Landau run with flatness-driven refinement.
pub fn run_wang_landau(config: &RunConfig, log: &LogContext) -> Result<RunSummary, RwchError> {
    run_units(config, log, Method::WangLandau, flat_histogram)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_ranges_overlap_both_neighbours() {
        let ranges = range_borders(&[0.0, 10.0, 20.0, 30.0], 10, 2);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].len(), 13);
        assert_eq!(ranges[0][0], 0.0);
        assert_eq!(ranges[0][10], 10.0);
        assert!((ranges[0][12] - 12.0).abs() < 1e-12);
        assert_eq!(ranges[1].len(), 15);
        assert!((ranges[1][0] - 8.0).abs() < 1e-12);
        assert_eq!(ranges[1][2], 10.0);
        assert_eq!(ranges[1][12], 20.0);
        assert_eq!(ranges[2].len(), 13);
        assert_eq!(ranges[2][12], 30.0);
    }

    #[test]
    fn single_range_has_no_overlap() {
        let ranges = range_borders(&[2.0, 5.0], 3, 4);
        assert_eq!(ranges, vec![vec![2.0, 3.0, 4.0, 5.0]]);
    }
}

//! Replica exchange over a fixed ladder of large-deviation temperatures.
//!
//! Replicas never move between workers and never exchange configurations;
//! only the replica to temperature assignment changes. Sweep blocks run in
//! parallel, the exchange round runs on the coordinating thread afterwards.

use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;
use rwch_core::{LogContext, RngHandle, RwchError};
use rwch_walk::{Diagnostics, Walk};

use crate::config::{Method, RunConfig};
use crate::determinism;
use crate::dispatch::{prepare_walk, thread_pool};
use crate::metropolis::Chain;
use crate::output::{DataWriter, ROW_COLUMNS};
use crate::stats::{Counters, Means};
use crate::summary::{RunSummary, SwapStats};

/// Sweeps every replica performs between two exchange rounds.
pub const EXCHANGE_BLOCK: usize = 100;

/// Acceptance of swapping the temperatures of two replicas holding `s_a` at
/// `theta_a` and `s_b` at `theta_b`, for weights `exp(-S / theta)`.
pub fn exchange_acceptance(s_a: f64, theta_a: f64, s_b: f64, theta_b: f64) -> f64 {
    ((1.0 / theta_b - 1.0 / theta_a) * (s_b - s_a)).exp().min(1.0)
}

/// Draws against [`exchange_acceptance`]; returns the decision and the probability.
pub fn attempt_exchange(
    s_a: f64,
    theta_a: f64,
    s_b: f64,
    theta_b: f64,
    rng: &mut RngHandle,
) -> (bool, f64) {
    let acceptance = exchange_acceptance(s_a, theta_a, s_b, theta_b);
    (rng.uniform() < acceptance, acceptance)
}

/// Replica to temperature-index permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemperatureAssignment {
    temperature: Vec<usize>,
}

impl TemperatureAssignment {
    /// Replica `i` holds temperature `i`.
    pub fn identity(replicas: usize) -> Self {
        Self {
            temperature: (0..replicas).collect(),
        }
    }

    /// Number of replicas.
    pub fn len(&self) -> usize {
        self.temperature.len()
    }

    /// Whether the ladder is empty.
    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }

    /// Temperature index held by `replica`.
    pub fn temperature_of(&self, replica: usize) -> usize {
        self.temperature[replica]
    }

    /// Temperature index to replica map.
    pub fn inverse(&self) -> Vec<usize> {
        let mut inverse = vec![0; self.temperature.len()];
        for (replica, &t) in self.temperature.iter().enumerate() {
            inverse[t] = replica;
        }
        inverse
    }

    /// Replica currently holding temperature index `t`.
    pub fn replica_at(&self, t: usize) -> usize {
        self.inverse()[t]
    }

    /// Exchanges the temperatures of replicas `a` and `b`.
    pub fn swap_temperatures(&mut self, a: usize, b: usize) {
        self.temperature.swap(a, b);
    }

    /// Every temperature is held by exactly one replica.
    pub fn is_bijection(&self) -> bool {
        let mut seen = vec![false; self.temperature.len()];
        for &t in &self.temperature {
            match seen.get_mut(t) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }

    /// Temperature index per replica.
    pub fn as_slice(&self) -> &[usize] {
        &self.temperature
    }
}

/// One exchange round: `k - 1` attempts on randomly chosen adjacent
/// temperature pairs, `energies` indexed by replica.
pub fn exchange_round(
    assignment: &mut TemperatureAssignment,
    energies: &[f64],
    thetas: &[f64],
    rng: &mut RngHandle,
    stats: &mut [SwapStats],
) {
    let k = thetas.len();
    if k < 2 {
        return;
    }
    for _ in 0..k - 1 {
        let j = 1 + rng.index(k - 1);
        let inverse = assignment.inverse();
        let (low, high) = (inverse[j - 1], inverse[j]);
        let (accepted, probability) = attempt_exchange(energies[low], thetas[j - 1], energies[high], thetas[j], rng);
        tracing::trace!(pair = j - 1, low, high, probability, accepted, "replica exchange");
        stats[j - 1].attempts += 1;
        if accepted {
            assignment.swap_temperatures(low, high);
            stats[j - 1].accepted += 1;
        }
    }
}

struct Replica {
    walk: Walk,
    rng: RngHandle,
    counters: Counters,
    rows: Vec<(usize, Diagnostics)>,
}

/// Runs `iterations` sweeps on every replica with an exchange round after
/// each block and one output file per temperature.
pub fn run_parallel_tempering(config: &RunConfig, log: &LogContext) -> Result<RunSummary, RwchError> {
    let thetas = &config.theta;
    let k = thetas.len();
    let chain = Chain {
        observable: config.observable,
        theta: None,
        sweep_len: config.sweep_len(),
    };
    let mut replicas = (0..k)
        .map(|r| {
            Ok(Replica {
                walk: prepare_walk(config, r)?,
                rng: determinism::monte_carlo_rng(config.seeds.monte_carlo, r),
                counters: Counters::default(),
                rows: Vec::with_capacity(EXCHANGE_BLOCK),
            })
        })
        .collect::<Result<Vec<_>, RwchError>>()?;
    let mut writers = config
        .output
        .data_paths
        .iter()
        .map(|path| DataWriter::create(Some(path.as_path())))
        .collect::<Result<Vec<_>, RwchError>>()?;
    for (writer, theta) in writers.iter_mut().zip(thetas) {
        writer.header(
            &format!(
                "parallel tempering at theta={theta} ({k} temperatures) and steps={}",
                config.walk.steps
            ),
            ROW_COLUMNS,
        )?;
    }
    let conf_paths: &[PathBuf] = &config.output.conf_paths;

    let mut assignment = TemperatureAssignment::identity(k);
    let mut exchange_rng = determinism::exchange_rng(config.seeds.monte_carlo);
    let mut stats: Vec<SwapStats> = thetas
        .windows(2)
        .map(|w| SwapStats {
            theta_low: w[0],
            theta_high: w[1],
            attempts: 0,
            accepted: 0,
        })
        .collect();
    let mut means = Means::default();
    let pool = thread_pool(config.parallel)?;
    let started = Instant::now();

    let mut done = 0;
    while done < config.iterations {
        let block = EXCHANGE_BLOCK.min(config.iterations - done);
        let held: Vec<f64> = (0..k).map(|r| thetas[assignment.temperature_of(r)]).collect();
        pool.install(|| {
            replicas
                .par_iter_mut()
                .zip(held.par_iter())
                .for_each(|(replica, &theta)| {
                    let _span = tracing::trace_span!("replica_block", theta, first_sweep = done).entered();
                    let chain = chain.at(theta);
                    replica.rows.clear();
                    for i in 0..block {
                        chain.sweep(&mut replica.walk, &mut replica.rng, &mut replica.counters);
                        replica.rows.push((done + i, replica.walk.diagnostics()));
                    }
                })
        });

        for (r, replica) in replicas.iter_mut().enumerate() {
            let t = assignment.temperature_of(r);
            for (sweep, row) in &replica.rows {
                if t == 0 {
                    means.push(row);
                }
                writers[t].row(*sweep, row)?;
            }
            if let Some(path) = conf_paths.get(t) {
                replica.walk.save_configuration(path)?;
            }
        }
        let energies: Vec<f64> = replicas
            .iter_mut()
            .map(|replica| config.observable.evaluate(&mut replica.walk))
            .collect();
        exchange_round(&mut assignment, &energies, thetas, &mut exchange_rng, &mut stats);
        log.debug(format_args!("after sweep {}: permutation {:?}", done + block, assignment.as_slice()));
        done += block;
    }

    let mut counters = Counters::default();
    for replica in &replicas {
        counters.merge(&replica.counters);
    }
    for writer in writers.iter_mut() {
        for pair in &stats {
            writer.comment(&format!(
                "exchange {} <-> {}: {} / {} accepted ({:.4})",
                pair.theta_low,
                pair.theta_high,
                pair.accepted,
                pair.attempts,
                pair.rate()
            ))?;
        }
        writer.footer(&counters, config.iterations * k, started.elapsed())?;
    }
    log.info(format_args!(
        "parallel tempering finished: {k} replicas, acceptance {:.4}, final permutation {:?}",
        counters.acceptance(),
        assignment.as_slice()
    ));

    let coldest = assignment.replica_at(0);
    let mut summary = RunSummary::new(
        Method::ParallelTempering,
        config.observable,
        counters,
        &means,
        replicas[coldest].walk.latent(),
    );
    summary.permutation = assignment.as_slice().to_vec();
    summary.swaps = stats;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_tracks_swaps() {
        let mut assignment = TemperatureAssignment::identity(4);
        assignment.swap_temperatures(0, 2);
        assert_eq!(assignment.as_slice(), &[2, 1, 0, 3]);
        assert_eq!(assignment.replica_at(2), 0);
        assert_eq!(assignment.inverse(), vec![2, 1, 0, 3]);
        assert!(assignment.is_bijection());
    }

    #[test]
    fn duplicates_break_the_bijection() {
        let assignment = TemperatureAssignment {
            temperature: vec![0, 0, 2],
        };
        assert!(!assignment.is_bijection());
        let out_of_range = TemperatureAssignment {
            temperature: vec![0, 3],
        };
        assert!(!out_of_range.is_bijection());
    }
}

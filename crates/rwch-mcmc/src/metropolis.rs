//! Large-deviation Metropolis sampling with automatic equilibration.
//!
//! A walk is weighted with `exp(-S / theta)`: negative `theta` favours large
//! values of the observable, positive `theta` small ones. Proposals are
//! symmetric, so the acceptance is `min(1, exp((S_old - S_new) / theta))`.

use std::path::PathBuf;
use std::time::Instant;

use rwch_core::{LogContext, RngHandle, RwchError};
use rwch_walk::{Construction, Observable, Walk};

use crate::config::{Method, RunConfig};
use crate::determinism;
use crate::dispatch::prepare_walk;
use crate::output::{DataWriter, ROW_COLUMNS};
use crate::stats::{Counters, Means, RollingMean};
use crate::summary::{Equilibration, RunSummary};

/// Width of the rolling windows compared during equilibration.
pub const EQUILIBRATION_WINDOW: usize = 100;
/// Relative variance drift below which the primary chain counts as settled.
pub const EQUILIBRATION_THRESHOLD: f64 = 0.05;

/// Whether a move from `old` to `new` survives against the uniform draw `u`.
pub fn metropolis_accept(old: f64, new: f64, theta: f64, u: f64) -> bool {
    let p = ((old - new) / theta).exp();
    !(p < u)
}

/// Sweep parameters shared by Metropolis, equilibration probes and replicas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chain {
    /// Observable in the weight.
    pub observable: Observable,
    /// Temperature; `None` accepts every proposal.
    pub theta: Option<f64>,
    /// Change trials per sweep.
    pub sweep_len: usize,
}

impl Chain {
    /// Chain described by `config`, using its first temperature.
    pub fn from_config(config: &RunConfig) -> Self {
        let theta = if config.simple_sampling {
            None
        } else {
            config.theta.first().copied()
        };
        Self {
            observable: config.observable,
            theta,
            sweep_len: config.sweep_len(),
        }
    }

    /// Same chain at temperature `theta`.
    pub fn at(self, theta: f64) -> Self {
        Self {
            theta: Some(theta),
            ..self
        }
    }

    /// One sweep of `sweep_len` change trials.
    pub fn sweep(&self, walk: &mut Walk, rng: &mut RngHandle, counters: &mut Counters) {
        for _ in 0..self.sweep_len {
            let Some(theta) = self.theta else {
                walk.change(rng);
                counters.tries += 1;
                continue;
            };
            let old = self.observable.evaluate(walk);
            walk.change(rng);
            counters.tries += 1;
            let new = self.observable.evaluate(walk);
            if !metropolis_accept(old, new, theta, rng.uniform()) {
                walk.undo_change();
                counters.rejections += 1;
            }
        }
    }
}

/// Runs `walk` until its rolling statistics settle and agree with probes
/// started from the largest and smallest observable constructions.
///
/// Sampling starts once the variance over the last window stays within
/// [`EQUILIBRATION_THRESHOLD`] of the variance over its newer half; the walk
/// is equilibrated when additionally every probe mean lies within one standard
/// deviation of the walk's mean. After `t_eq_max` sweeps detection gives up and
/// `t_eq_max` is used.
pub fn equilibrate(
    chain: &Chain,
    walk: &mut Walk,
    rng: &mut RngHandle,
    t_eq_max: usize,
    probe_seed: u64,
    log: &LogContext,
) -> Equilibration {
    let _span = tracing::debug_span!("equilibrate", theta = ?chain.theta, t_eq_max).entered();
    let mut probes: Vec<(Walk, RngHandle, RollingMean)> = [true, false]
        .into_iter()
        .enumerate()
        .map(|(i, maximize)| {
            let mut probe = walk.clone();
            let mut rng = determinism::probe_rng(probe_seed, i);
            probe.degenerate(Construction::extreme(chain.observable, maximize), &mut rng);
            (probe, rng, RollingMean::new(EQUILIBRATION_WINDOW))
        })
        .collect();

    let mut primary = RollingMean::new(EQUILIBRATION_WINDOW);
    let mut unused = Counters::default();
    let mut settled = false;
    let mut t = 0;
    loop {
        chain.sweep(walk, rng, &mut unused);
        primary.add(chain.observable.evaluate(walk));
        for (probe, probe_rng, mean) in probes.iter_mut() {
            chain.sweep(probe, probe_rng, &mut unused);
            mean.add(chain.observable.evaluate(probe));
        }

        if !settled && t >= EQUILIBRATION_WINDOW {
            let (var, recent) = (primary.var(), primary.var_recent(EQUILIBRATION_WINDOW / 2));
            let drift = if var == 0.0 && recent == 0.0 {
                0.0
            } else {
                (var / recent - 1.0).abs()
            };
            settled = drift < EQUILIBRATION_THRESHOLD;
        }
        let sdev = primary.var().sqrt();
        if settled && probes.iter().all(|(_, _, mean)| (primary.mean() - mean.mean()).abs() <= sdev) {
            log.info(format_args!("equilibration estimate: t_eq = {t}"));
            return Equilibration {
                sweeps: t,
                converged: true,
            };
        }
        if t >= t_eq_max {
            log.warn(format_args!(
                "not equilibrated after {t_eq_max} sweeps, continuing with t_eq = {t_eq_max}"
            ));
            return Equilibration {
                sweeps: t_eq_max,
                converged: false,
            };
        }
        t += 1;
    }
}

/// Metropolis run: equilibrate, then write one row per sweep for `iterations` sweeps.
pub fn run_metropolis(config: &RunConfig, log: &LogContext) -> Result<RunSummary, RwchError> {
    let chain = Chain::from_config(config);
    let mut walk = prepare_walk(config, 0)?;
    let mut rng = determinism::monte_carlo_rng(config.seeds.monte_carlo, 0);
    let conf_path: Option<PathBuf> = config.output.conf_paths.first().cloned();
    let mut out = DataWriter::create(config.output.data_paths.first().map(PathBuf::as_path))?;
    let title = match chain.theta {
        Some(theta) => format!(
            "large deviation simulation at theta={theta} and steps={}",
            config.walk.steps
        ),
        None => format!("simple sampling Metropolis with steps={}", config.walk.steps),
    };
    out.header(&title, ROW_COLUMNS)?;

    let started = Instant::now();
    let equilibration = match config.equilibration.t_eq {
        Some(sweeps) => Equilibration {
            sweeps,
            converged: true,
        },
        None => log.in_scope(|| {
            equilibrate(
                &chain,
                &mut walk,
                &mut rng,
                config.equilibration.t_eq_max,
                config.seeds.monte_carlo,
                log,
            )
        }),
    };
    let t_eq = equilibration.sweeps;
    if !equilibration.converged {
        out.comment(&format!("not equilibrated, using t_eq = {t_eq}"))?;
    }

    let mut counters = Counters::default();
    let mut means = Means::default();
    for sweep in t_eq..config.iterations + 2 * t_eq {
        chain.sweep(&mut walk, &mut rng, &mut counters);
        if sweep >= 2 * t_eq {
            if let Some(path) = conf_path.as_deref() {
                walk.save_configuration(path)?;
            }
            let row = walk.diagnostics();
            means.push(&row);
            out.row(sweep, &row)?;
        }
    }
    out.footer(&counters, config.iterations, started.elapsed())?;
    log.info(format_args!(
        "metropolis finished: {} proposals, acceptance {:.4}",
        counters.tries,
        counters.acceptance()
    ));

    let mut summary = RunSummary::new(Method::Metropolis, config.observable, counters, &means, walk.latent());
    summary.equilibration = Some(equilibration);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downhill_moves_are_always_accepted() {
        assert!(metropolis_accept(5.0, 4.0, 1.0, 0.999));
        assert!(metropolis_accept(4.0, 5.0, -1.0, 0.999));
        assert!(!metropolis_accept(4.0, 5.0, 1.0, 0.5));
        // exp(-1) = 0.3679
        assert!(metropolis_accept(4.0, 5.0, 1.0, 0.36));
    }
}

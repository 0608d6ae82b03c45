//! The 1/t variant of Wang-Landau sampling.
//!
//! Time `t` is counted in sweeps. The refinement parameter first halves each
//! time every bin has been visited, then follows `ln f = 1/t` once it has
//! caught up with that curve, and a closing entropic-sampling pass removes the
//! residual bias.

use rwch_core::{LogContext, RwchError};

use crate::config::{Method, RunConfig};
use crate::histogram::Histogram;
use crate::summary::RunSummary;
use crate::wang_landau::{run_units, Unit};

/// Sweeps between two checks of the visit histogram in the halving phase.
pub const INITIAL_BATCH: usize = 200;

/// Value of the power-law schedule at time `t`.
pub fn one_over_t(t: f64) -> f64 {
    1.0 / t
}

fn one_over_t_schedule(unit: &mut Unit, config: &RunConfig, log: &LogContext) {
    let observable = config.observable;
    let sweep = config.sweep_len();
    let mut visits = Histogram::from_borders(unit.g.borders().to_vec());
    let mut lnf = 1.0;
    let mut lnf_min = config.wang_landau.lnf_min;
    let mut t = 0.0;

    'halving: while t < 10.0 || lnf > one_over_t(t) {
        loop {
            for _ in 0..INITIAL_BATCH {
                unit.refine(observable, sweep, lnf, &mut visits);
                t += 1.0;
            }
            if visits.all_visited() {
                break;
            }
            if lnf_min > one_over_t(t) {
                lnf_min = 1.0 / (t + 1.0 / lnf_min);
                log.warn(format_args!(
                    "bins still unvisited after {t} sweeps, leaving the halving phase at lnf = {lnf:e}"
                ));
                break 'halving;
            }
        }
        visits.reset();
        lnf /= 2.0;
    }
    log.debug(format_args!("halving phase done after {t} sweeps"));

    if lnf_min > one_over_t(t) {
        lnf_min = 1.0 / (t + 1.0 / lnf_min);
    }
    let mut discard = Histogram::from_borders(Vec::new());
    while one_over_t(t) > lnf_min {
        unit.refine(observable, sweep, one_over_t(t), &mut discard);
        t += 1.0;
    }
    log.debug(format_args!("1/t phase done after {t} sweeps"));

    if !config.wang_landau.entropic_pass {
        return;
    }
    visits.reset();
    for _ in 0..t as u64 {
        for _ in 0..sweep {
            let s = unit.trial(observable);
            visits.add(s, 1.0);
        }
    }
    unit.g.apply_entropic_correction(&visits);
    log.debug(format_args!(
        "entropic pass done, {} of {} bins visited",
        visits.values().iter().filter(|h| **h > 0.0).count(),
        visits.num_bins()
    ));
}

/// Wang-Landau run with the 1/t schedule.
pub fn run_fast_wang_landau(config: &RunConfig, log: &LogContext) -> Result<RunSummary, RwchError> {
    run_units(config, log, Method::FastWangLandau, one_over_t_schedule)
}

//! Independent realizations without any Markov chain.

use std::path::PathBuf;
use std::time::Instant;

use rwch_core::{LogContext, RwchError};

use crate::config::{Method, RunConfig};
use crate::dispatch::prepare_walk;
use crate::output::{DataWriter, ROW_COLUMNS};
use crate::stats::{Counters, Means};
use crate::summary::RunSummary;

/// Draws `iterations` fresh walks and writes one row for each.
pub fn run_simple_sampling(config: &RunConfig, log: &LogContext) -> Result<RunSummary, RwchError> {
    let mut walk = prepare_walk(config, 0)?;
    let conf_path = config.output.conf_paths.first().cloned();
    let mut out = DataWriter::create(config.output.data_paths.first().map(PathBuf::as_path))?;
    out.header(
        &format!(
            "simple sampling of {} walks in d={} with steps={}",
            config.walk.kind.name(),
            config.walk.dimension,
            config.walk.steps
        ),
        ROW_COLUMNS,
    )?;

    let started = Instant::now();
    let mut means = Means::default();
    for i in 0..config.iterations {
        if i > 0 {
            walk.reconstruct();
        }
        if let Some(path) = conf_path.as_deref() {
            walk.save_configuration(path)?;
        }
        let row = walk.diagnostics();
        means.push(&row);
        out.row(i, &row)?;
    }
    let counters = Counters::default();
    out.footer(&counters, config.iterations, started.elapsed())?;
    log.info(format_args!("simple sampling finished: {} realizations", means.samples()));

    Ok(RunSummary::new(
        Method::SimpleSampling,
        config.observable,
        counters,
        &means,
        walk.latent(),
    ))
}

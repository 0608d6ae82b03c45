//! Method selection and the shared worker pool.

use rayon::ThreadPool;
use rwch_core::{ErrorInfo, LogContext, RwchError};
use rwch_walk::Walk;

use crate::config::{Method, RunConfig};
use crate::determinism::realization_seed;
use crate::fast_wang_landau::run_fast_wang_landau;
use crate::metropolis::run_metropolis;
use crate::simple::run_simple_sampling;
use crate::summary::RunSummary;
use crate::tempering::run_parallel_tempering;
use crate::wang_landau::run_wang_landau;

/// Validates `config` and runs the sampler it selects.
///
/// Configuration errors surface before any walk is drawn or file written.
pub fn run(config: &RunConfig, log: &LogContext) -> Result<RunSummary, RwchError> {
    config.validate(log)?;
    log.info(format_args!(
        "{} of {} {} walks in d={} with steps={}",
        config.method.name(),
        config.observable.name(),
        config.walk.kind.name(),
        config.walk.dimension,
        config.walk.steps
    ));
    log.in_scope(|| match config.method {
        Method::SimpleSampling => run_simple_sampling(config, log),
        Method::Metropolis => run_metropolis(config, log),
        Method::WangLandau => run_wang_landau(config, log),
        Method::FastWangLandau => run_fast_wang_landau(config, log),
        Method::ParallelTempering => run_parallel_tempering(config, log),
    })
}

/// Worker pool with `parallel` threads, all cores for zero.
pub fn thread_pool(parallel: usize) -> Result<ThreadPool, RwchError> {
    let threads = if parallel == 0 {
        rayon::current_num_threads()
    } else {
        parallel
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|err| RwchError::Configuration(ErrorInfo::new("thread-pool", err.to_string())))
}

/// Walk of worker, replica or unit `index`, drawn from its own realization seed.
pub fn prepare_walk(config: &RunConfig, index: usize) -> Result<Walk, RwchError> {
    Walk::new(
        &config.walk,
        config.hull,
        realization_seed(config.seeds.realization, index),
    )
}

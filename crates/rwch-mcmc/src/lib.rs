#![deny(missing_docs)]

//! Samplers for the convex hulls of random walks: simple sampling,
//! large-deviation Metropolis, Wang-Landau (flat-histogram and 1/t) and
//! parallel tempering, driven by a YAML run configuration.

/// YAML configuration schema, defaults and validation.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Validation and sampler selection.
pub mod dispatch;
/// 1/t Wang-Landau with an entropic-sampling pass.
pub mod fast_wang_landau;
/// Visit histograms and density-of-states estimates.
pub mod histogram;
/// Metropolis sampling and equilibration detection.
pub mod metropolis;
/// Plain-text data files.
pub mod output;
/// Independent realizations.
pub mod simple;
/// Rolling statistics and proposal counters.
pub mod stats;
/// Serializable run summaries.
pub mod summary;
/// Replica exchange helpers and sampler.
pub mod tempering;
/// Flat-histogram Wang-Landau sampling.
pub mod wang_landau;

pub use config::{
    EquilibrationConfig, Method, OutputConfig, RunConfig, SeedConfig, WangLandauConfig,
};
pub use dispatch::{prepare_walk, run, thread_pool};
pub use histogram::{DensityOfStates, Histogram};
pub use metropolis::{equilibrate, metropolis_accept, Chain};
pub use summary::{DensityRecord, Equilibration, RunSummary, SwapStats};
pub use tempering::{exchange_acceptance, TemperatureAssignment};

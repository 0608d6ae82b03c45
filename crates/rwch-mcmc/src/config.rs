//! Run configuration: the YAML schema, its defaults and up-front validation.

use std::fs;
use std::path::{Path, PathBuf};

use rwch_core::{ErrorInfo, LogContext, RwchError, Verbosity};
use rwch_hull::{HullAlgorithm, HullOptions};
use rwch_walk::{Observable, WalkKind, WalkParams};
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters governing a sampling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Walk kind, dimension and length.
    #[serde(default)]
    pub walk: WalkParams,
    /// Hull algorithm and culling switch.
    #[serde(default)]
    pub hull: HullOptions,
    /// Statistic the samplers bias on.
    #[serde(default)]
    pub observable: Observable,
    /// Sampler to run.
    #[serde(default)]
    pub method: Method,
    /// Number of samples (sweeps, realizations or Wang-Landau repetitions).
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Change trials per sweep; defaults to the number of steps.
    #[serde(default)]
    pub sweep: Option<usize>,
    /// Equilibration override and cap.
    #[serde(default)]
    pub equilibration: EquilibrationConfig,
    /// Large-deviation temperatures; one per replica for tempering.
    #[serde(default = "default_theta")]
    pub theta: Vec<f64>,
    /// Metropolis at infinite temperature.
    #[serde(default)]
    pub simple_sampling: bool,
    /// Wang-Landau ranges and refinement schedule.
    #[serde(default)]
    pub wang_landau: WangLandauConfig,
    /// Realization and Monte-Carlo seeds.
    #[serde(default)]
    pub seeds: SeedConfig,
    /// Worker threads, 0 for all cores.
    #[serde(default)]
    pub parallel: usize,
    /// Output files.
    #[serde(default)]
    pub output: OutputConfig,
    /// Sampler-level reporting.
    #[serde(default)]
    pub verbosity: Verbosity,
}

fn default_iterations() -> usize {
    100
}

fn default_theta() -> Vec<f64> {
    vec![10_000.0]
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            walk: WalkParams::default(),
            hull: HullOptions::default(),
            observable: Observable::default(),
            method: Method::default(),
            iterations: default_iterations(),
            sweep: None,
            equilibration: EquilibrationConfig::default(),
            theta: default_theta(),
            simple_sampling: false,
            wang_landau: WangLandauConfig::default(),
            seeds: SeedConfig::default(),
            parallel: 0,
            output: OutputConfig::default(),
            verbosity: Verbosity::default(),
        }
    }
}

/// Available samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Independent realizations.
    #[default]
    SimpleSampling,
    /// Large-deviation Metropolis with automatic equilibration.
    Metropolis,
    /// Flat-histogram Wang-Landau.
    WangLandau,
    /// 1/t Wang-Landau followed by entropic sampling.
    FastWangLandau,
    /// Replica exchange over a ladder of temperatures.
    ParallelTempering,
}

impl Method {
    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Method::SimpleSampling => "simple-sampling",
            Method::Metropolis => "metropolis",
            Method::WangLandau => "wang-landau",
            Method::FastWangLandau => "fast-wang-landau",
            Method::ParallelTempering => "parallel-tempering",
        }
    }

    fn is_wang_landau(&self) -> bool {
        matches!(self, Method::WangLandau | Method::FastWangLandau)
    }
}

/// Equilibration settings for the Metropolis sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibrationConfig {
    /// Fixed equilibration time in sweeps; detected automatically when absent.
    #[serde(default)]
    pub t_eq: Option<usize>,
    /// Sweeps after which automatic detection gives up.
    #[serde(default = "default_t_eq_max")]
    pub t_eq_max: usize,
}

fn default_t_eq_max() -> usize {
    100_000
}

impl Default for EquilibrationConfig {
    fn default() -> Self {
        Self {
            t_eq: None,
            t_eq_max: default_t_eq_max(),
        }
    }
}

/// Wang-Landau parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WangLandauConfig {
    /// Borders of the energy ranges; derived from the extremal walks when empty.
    #[serde(default)]
    pub borders: Vec<f64>,
    /// Bins per range.
    #[serde(default = "default_bins")]
    pub bins: usize,
    /// Bins each range reaches into its neighbours.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    /// Minimum over mean of the visit histogram that counts as flat.
    #[serde(default = "default_flatness")]
    pub flatness: f64,
    /// Final refinement parameter.
    #[serde(default = "default_lnf_min")]
    pub lnf_min: f64,
    /// Trials after which a refinement stage is forced to finish.
    #[serde(default = "default_stage_trial_cap")]
    pub stage_trial_cap: u64,
    /// Trials the start search may spend before the walk is redrawn.
    #[serde(default = "default_start_budget")]
    pub start_budget: u64,
    /// Whether the 1/t variant finishes with an entropic-sampling pass.
    #[serde(default = "default_entropic_pass")]
    pub entropic_pass: bool,
}

fn default_bins() -> usize {
    100
}

fn default_overlap() -> usize {
    10
}

fn default_flatness() -> f64 {
    0.8
}

fn default_lnf_min() -> f64 {
    1e-8
}

fn default_stage_trial_cap() -> u64 {
    100_000_000
}

fn default_start_budget() -> u64 {
    1_000_000
}

fn default_entropic_pass() -> bool {
    true
}

impl Default for WangLandauConfig {
    fn default() -> Self {
        Self {
            borders: Vec::new(),
            bins: default_bins(),
            overlap: default_overlap(),
            flatness: default_flatness(),
            lnf_min: default_lnf_min(),
            stage_trial_cap: default_stage_trial_cap(),
            start_budget: default_start_budget(),
            entropic_pass: default_entropic_pass(),
        }
    }
}

/// Seeds of the two independent random streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SeedConfig {
    /// Seed for walk realizations.
    #[serde(default)]
    pub realization: u64,
    /// Seed for Monte-Carlo proposals and acceptance draws.
    #[serde(default)]
    pub monte_carlo: u64,
}

/// Output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Data files; one per temperature for tempering, otherwise the first is used.
    #[serde(default)]
    pub data_paths: Vec<PathBuf>,
    /// Configuration logs, parallel to `data_paths`.
    #[serde(default)]
    pub conf_paths: Vec<PathBuf>,
}

impl RunConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, RwchError> {
        serde_yaml::from_str(text)
            .map_err(|err| RwchError::Serde(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Loads and normalises a YAML file.
    pub fn load(path: &Path) -> Result<Self, RwchError> {
        let text = fs::read_to_string(path).map_err(|err| {
            RwchError::Io(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let mut config = Self::from_yaml_str(&text).map_err(|err| {
            RwchError::Serde(err.info().clone().with_context("path", path.display().to_string()))
        })?;
        config.normalize();
        Ok(config)
    }

    /// Serialises the configuration back to YAML.
    pub fn to_yaml(&self) -> Result<String, RwchError> {
        serde_yaml::to_string(self)
            .map_err(|err| RwchError::Serde(ErrorInfo::new("config-serialize", err.to_string())))
    }

    /// Sorts and deduplicates the Wang-Landau borders.
    pub fn normalize(&mut self) {
        let borders = &mut self.wang_landau.borders;
        borders.sort_by(f64::total_cmp);
        borders.dedup();
    }

    /// Change trials per sweep.
    pub fn sweep_len(&self) -> usize {
        self.sweep.unwrap_or(self.walk.steps).max(1)
    }

    /// Checks the configuration before any sampling starts.
    ///
    /// Contradictions are errors; flags that merely have no effect on the
    /// selected method are reported through `log`.
    pub fn validate(&self, log: &LogContext) -> Result<(), RwchError> {
        self.walk.validate()?;
        let d = self.walk.dimension;
        self.hull
            .check(d)
            .map_err(|err| RwchError::Configuration(err.info().clone()))?;

        if let Observable::Passage { start } = self.observable {
            if start >= self.walk.steps {
                return Err(config_error(
                    "passage-start",
                    format!("passage search starts at {start} but the walk has {} steps", self.walk.steps),
                ));
            }
        }
        if self.theta.iter().any(|t| *t == 0.0 || !t.is_finite()) {
            return Err(config_error("theta-value", "temperatures must be finite and non-zero"));
        }

        match self.method {
            Method::Metropolis if !self.simple_sampling && self.theta.len() != 1 => {
                return Err(config_error_with_hint(
                    "metropolis-theta",
                    format!("Metropolis takes exactly one theta, got {}", self.theta.len()),
                    "use parallel-tempering for several temperatures",
                ));
            }
            Method::ParallelTempering => self.validate_tempering()?,
            method if method.is_wang_landau() => self.validate_wang_landau()?,
            _ => {}
        }

        if self.simple_sampling && self.method != Method::Metropolis {
            log.warn(format_args!(
                "simple_sampling has no effect on {}",
                self.method.name()
            ));
        }
        if !self.method.is_wang_landau() && !self.wang_landau.borders.is_empty() {
            log.warn(format_args!(
                "wang_landau.borders are ignored by {}",
                self.method.name()
            ));
        }
        if self.method != Method::Metropolis && self.equilibration.t_eq.is_some() {
            log.warn(format_args!(
                "equilibration.t_eq is ignored by {}",
                self.method.name()
            ));
        }
        if self.hull.algorithm == HullAlgorithm::Nop {
            log.warn("hull computation disabled; observables read as zero");
        }
        if self.walk.kind == WalkKind::LoopErased && d > 3 {
            log.info("loop erasure in high dimension rarely erases anything");
        }
        Ok(())
    }

    fn validate_tempering(&self) -> Result<(), RwchError> {
        if self.theta.is_empty() {
            return Err(config_error("tempering-theta", "parallel tempering needs temperatures"));
        }
        if self.output.data_paths.len() != self.theta.len() {
            return Err(config_error_with_hint(
                "tempering-paths",
                format!(
                    "{} temperatures but {} data paths",
                    self.theta.len(),
                    self.output.data_paths.len()
                ),
                "give one data path per temperature",
            ));
        }
        if !self.output.conf_paths.is_empty() && self.output.conf_paths.len() != self.theta.len() {
            return Err(config_error(
                "tempering-conf-paths",
                format!(
                    "{} temperatures but {} configuration paths",
                    self.theta.len(),
                    self.output.conf_paths.len()
                ),
            ));
        }
        Ok(())
    }

    fn validate_wang_landau(&self) -> Result<(), RwchError> {
        let wl = &self.wang_landau;
        let mut borders = wl.borders.clone();
        borders.sort_by(f64::total_cmp);
        borders.dedup();
        if !wl.borders.is_empty() && borders.len() < 2 {
            return Err(config_error_with_hint(
                "wang-landau-borders",
                "Wang-Landau needs at least two distinct borders",
                "leave borders empty to derive them from the extremal walks",
            ));
        }
        if borders.iter().any(|b| !b.is_finite()) {
            return Err(config_error("wang-landau-borders", "borders must be finite"));
        }
        if !(wl.flatness > 0.0 && wl.flatness < 1.0) {
            return Err(config_error(
                "wang-landau-flatness",
                format!("flatness must lie in (0, 1), got {}", wl.flatness),
            ));
        }
        if !(wl.lnf_min > 0.0) {
            return Err(config_error("wang-landau-lnf", "lnf_min must be positive"));
        }
        if wl.bins == 0 {
            return Err(config_error("wang-landau-bins", "Wang-Landau needs at least one bin"));
        }
        Ok(())
    }
}

fn config_error(code: &str, message: impl Into<String>) -> RwchError {
    RwchError::Configuration(ErrorInfo::new(code, message))
}

fn config_error_with_hint(code: &str, message: impl Into<String>, hint: &str) -> RwchError {
    RwchError::Configuration(ErrorInfo::new(code, message).with_hint(hint))
}

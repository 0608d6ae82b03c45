//! Serializable run summaries.

use rwch_walk::Observable;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Method;
use crate::stats::{Counters, Means};

/// Outcome of the equilibration detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equilibration {
    /// Sweeps taken as equilibration time.
    pub sweeps: usize,
    /// False when the cap was hit before the probes agreed.
    pub converged: bool,
}

/// One Wang-Landau estimate of a single energy range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityRecord {
    /// Repetition index.
    pub iteration: usize,
    /// Energy range index.
    pub range: usize,
    /// Bin borders.
    pub borders: Vec<f64>,
    /// Unnormalised `ln g` per bin.
    pub log_density: Vec<f64>,
}

/// Acceptance statistics of one adjacent temperature pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapStats {
    /// Lower temperature of the pair.
    pub theta_low: f64,
    /// Upper temperature of the pair.
    pub theta_high: f64,
    /// Attempted exchanges.
    pub attempts: u64,
    /// Accepted exchanges.
    pub accepted: u64,
}

impl SwapStats {
    /// Accepted fraction of attempts.
    pub fn rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempts as f64
        }
    }
}

/// Summary returned to callers after a run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Sampler that ran.
    pub method: Method,
    /// Observable it was biased on.
    pub observable: Observable,
    /// Proposed and rejected changes over all workers.
    pub counters: Counters,
    /// Fraction of kept proposals.
    pub acceptance: f64,
    /// Rows written.
    pub samples: usize,
    /// Mean hull surface over the rows.
    pub mean_l: f64,
    /// Mean hull volume over the rows.
    pub mean_a: f64,
    /// Mean end-to-end distance over the rows.
    pub mean_r: f64,
    /// Mean squared end-to-end distance over the rows.
    pub mean_r2: f64,
    /// Equilibration outcome (Metropolis only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equilibration: Option<Equilibration>,
    /// Final replica to temperature assignment (tempering only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permutation: Vec<usize>,
    /// Exchange statistics per adjacent pair (tempering only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub swaps: Vec<SwapStats>,
    /// Density estimates (Wang-Landau only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub densities: Vec<DensityRecord>,
    /// SHA-256 of the final latent vector of the reference walk.
    pub latent_digest: String,
}

impl RunSummary {
    /// Summary skeleton for `method` with the shared statistics filled in.
    pub fn new(method: Method, observable: Observable, counters: Counters, means: &Means, latent: &[f64]) -> Self {
        let (mean_l, mean_a, mean_r, mean_r2) = means.averages();
        Self {
            method,
            observable,
            counters,
            acceptance: counters.acceptance(),
            samples: means.samples(),
            mean_l,
            mean_a,
            mean_r,
            mean_r2,
            equilibration: None,
            permutation: Vec::new(),
            swaps: Vec::new(),
            densities: Vec::new(),
            latent_digest: latent_digest(latent),
        }
    }
}

/// Hex SHA-256 over the little-endian bytes of `latent`.
pub fn latent_digest(latent: &[f64]) -> String {
    let mut hasher = Sha256::new();
    for value in latent {
        hasher.update(value.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

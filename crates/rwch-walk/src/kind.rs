//! Walk kinds and their latent-to-step mappings.

use std::f64::consts::PI;

use rwch_core::{ErrorInfo, RngHandle, RwchError, Step};
use serde::{Deserialize, Serialize};

/// The walk families sharing the mutation, hull and sampling machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalkKind {
    /// Hypercubic lattice walk, one uniform number per step.
    Lattice,
    /// Unit-length steps in a uniformly random direction, `d - 1` angles per step.
    Real,
    /// Gaussian displacements, `d` standard normals per step.
    Gauss,
    /// Lattice self-avoiding walk with pivot moves.
    SelfAvoiding,
    /// Chronologically loop-erased lattice walk.
    LoopErased,
}

impl Default for WalkKind {
    fn default() -> Self {
        WalkKind::Lattice
    }
}

impl WalkKind {
    /// Latent numbers consumed per step.
    pub fn arity(self, d: usize) -> usize {
        match self {
            WalkKind::Real => d - 1,
            WalkKind::Gauss => d,
            WalkKind::Lattice | WalkKind::SelfAvoiding | WalkKind::LoopErased => 1,
        }
    }

    /// Steps live on the hypercubic lattice.
    pub fn is_lattice(self) -> bool {
        matches!(self, WalkKind::Lattice | WalkKind::SelfAvoiding | WalkKind::LoopErased)
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            WalkKind::Lattice => "lattice",
            WalkKind::Real => "real",
            WalkKind::Gauss => "gauss",
            WalkKind::SelfAvoiding => "self-avoiding",
            WalkKind::LoopErased => "loop-erased",
        }
    }

    /// Draws one latent number from the kind's distribution.
    pub fn draw(self, rng: &mut RngHandle) -> f64 {
        match self {
            WalkKind::Gauss => rng.gaussian(),
            _ => rng.uniform(),
        }
    }

    /// Maps one arity-sized latent slice onto a step.
    pub fn step(self, d: usize, slice: &[f64]) -> Step<f64> {
        match self {
            WalkKind::Real => spherical(d, slice),
            WalkKind::Gauss => Step::from_vec(slice.to_vec()),
            _ => Step::<i64>::lattice(d, slice[0]).to_f64(),
        }
    }
}

/// Unit vector from `d - 1` uniform numbers via hyperspherical coordinates.
///
/// The first `d - 2` angles range over `[0, pi)`, the last over `[0, 2 pi)`.
pub fn spherical(d: usize, u: &[f64]) -> Step<f64> {
    let theta: Vec<f64> = (0..d - 1)
        .map(|j| if j + 2 < d { u[j] * PI } else { u[j] * 2.0 * PI })
        .collect();
    let mut coords = Vec::with_capacity(d);
    let mut sines = 1.0;
    for t in &theta {
        coords.push(sines * t.cos());
        sines *= t.sin();
    }
    coords.push(sines);
    Step::from_vec(coords)
}

/// Shape parameters of a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkParams {
    /// Walk family.
    pub kind: WalkKind,
    /// Spatial dimension.
    pub dimension: usize,
    /// Number of steps.
    pub steps: usize,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            kind: WalkKind::Lattice,
            dimension: 2,
            steps: 100,
        }
    }
}

impl WalkParams {
    /// Parameters for a walk of `steps` steps in `dimension` dimensions.
    pub fn new(kind: WalkKind, dimension: usize, steps: usize) -> Self {
        Self { kind, dimension, steps }
    }

    /// Rejects shapes no walk can take.
    pub fn validate(&self) -> Result<(), RwchError> {
        if self.dimension < 2 {
            return Err(RwchError::Configuration(
                ErrorInfo::new("walk-dimension", "walks need at least two dimensions")
                    .with_context("dimension", self.dimension.to_string()),
            ));
        }
        if self.steps == 0 {
            return Err(RwchError::Configuration(
                ErrorInfo::new("walk-steps", "walks need at least one step")
                    .with_context("kind", self.kind.name()),
            ));
        }
        Ok(())
    }
}

//! Scalar observables driving the samplers.

use serde::{Deserialize, Serialize};

use crate::walk::Walk;

/// Statistic of a walk selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Observable {
    /// Hull surface `L`.
    Surface,
    /// Hull volume `A`.
    Volume,
    /// First sign change of the x coordinate after step `start`.
    Passage {
        /// Step the search starts from.
        start: usize,
    },
}

impl Default for Observable {
    fn default() -> Self {
        Observable::Volume
    }
}

impl Observable {
    /// Evaluates the observable on `walk`, rebuilding the hull if needed.
    pub fn evaluate(&self, walk: &mut Walk) -> f64 {
        match *self {
            Observable::Surface => walk.l(),
            Observable::Volume => walk.a(),
            Observable::Passage { start } => walk.passage(start, 0) as f64,
        }
    }

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Observable::Surface => "surface",
            Observable::Volume => "volume",
            Observable::Passage { .. } => "passage",
        }
    }
}

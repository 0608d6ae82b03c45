//! Rolling windows, trial counters and running means.

use std::collections::VecDeque;

use rwch_walk::Diagnostics;
use serde::{Deserialize, Serialize};

/// Mean and variance over the most recent `window` values.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    values: VecDeque<f64>,
    mean: f64,
}

impl RollingMean {
    /// Creates an empty window of width `window`.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            values: VecDeque::with_capacity(window.max(1)),
            mean: 0.0,
        }
    }

    /// Appends `value`, dropping the oldest one once the window is full.
    pub fn add(&mut self, value: f64) -> f64 {
        if self.values.len() == self.window {
            self.values.pop_back();
        }
        self.values.push_front(value);
        self.mean = self.values.iter().sum::<f64>() / self.values.len() as f64;
        self.mean
    }

    /// Mean of the window.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Variance of the whole window around its mean.
    pub fn var(&self) -> f64 {
        self.var_recent(self.values.len())
    }

    /// Mean squared deviation of the newest `last` values from the window mean.
    pub fn var_recent(&self, last: usize) -> f64 {
        let last = last.min(self.values.len());
        if last == 0 {
            return 0.0;
        }
        self.values
            .iter()
            .take(last)
            .map(|v| (v - self.mean) * (v - self.mean))
            .sum::<f64>()
            / last as f64
    }

    /// Number of values currently held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value was added yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Proposal bookkeeping of one worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Proposed changes.
    pub tries: u64,
    /// Changes that were undone.
    pub rejections: u64,
}

impl Counters {
    /// Adds another worker's counts.
    pub fn merge(&mut self, other: &Counters) {
        self.tries += other.tries;
        self.rejections += other.rejections;
    }

    /// Fraction of proposals that were kept.
    pub fn acceptance(&self) -> f64 {
        if self.tries == 0 {
            0.0
        } else {
            1.0 - self.rejections as f64 / self.tries as f64
        }
    }
}

/// Running sums of the reported observables.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Means {
    samples: usize,
    l: f64,
    a: f64,
    r: f64,
    r2: f64,
}

impl Means {
    /// Adds one row.
    pub fn push(&mut self, diagnostics: &Diagnostics) {
        self.samples += 1;
        self.l += diagnostics.l;
        self.a += diagnostics.a;
        self.r += diagnostics.r;
        self.r2 += diagnostics.r2;
    }

    /// Number of rows.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// `(L, A, r, r2)` averages, zero without samples.
    pub fn averages(&self) -> (f64, f64, f64, f64) {
        if self.samples == 0 {
            return (0.0, 0.0, 0.0, 0.0);
        }
        let n = self.samples as f64;
        (self.l / n, self.a / n, self.r / n, self.r2 / n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_drops_oldest_values() {
        let mut rolling = RollingMean::new(3);
        for v in [1.0, 2.0, 3.0, 10.0] {
            rolling.add(v);
        }
        assert_eq!(rolling.len(), 3);
        assert!((rolling.mean() - 5.0).abs() < 1e-12);
        // newest value only: (10 - 5)^2
        assert!((rolling.var_recent(1) - 25.0).abs() < 1e-12);
        assert!((rolling.var() - (9.0 + 4.0 + 25.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn acceptance_without_tries_is_zero() {
        assert_eq!(Counters::default().acceptance(), 0.0);
        let counters = Counters { tries: 4, rejections: 1 };
        assert!((counters.acceptance() - 0.75).abs() < 1e-12);
    }
}

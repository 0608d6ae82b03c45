//! Binned accumulators over the observable's range.
//!
//! Bins are half-open `[b_k, b_{k+1})` except the last, which also holds its
//! upper border so that the extremal walks are counted.

use serde::{Deserialize, Serialize};

/// Visit histogram with possibly irregular borders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    borders: Vec<f64>,
    counts: Vec<f64>,
    total: u64,
    sum: f64,
    below: f64,
    above: f64,
    min: f64,
}

impl Histogram {
    /// `bins` equal bins over `[lower, upper]`.
    pub fn uniform(bins: usize, lower: f64, upper: f64) -> Self {
        let width = (upper - lower) / bins.max(1) as f64;
        let mut borders: Vec<f64> = (0..bins.max(1)).map(|k| lower + k as f64 * width).collect();
        borders.push(upper);
        Self::from_borders(borders)
    }

    /// Histogram over explicit ascending `borders`.
    pub fn from_borders(borders: Vec<f64>) -> Self {
        let bins = borders.len().saturating_sub(1);
        Self {
            borders,
            counts: vec![0.0; bins],
            total: 0,
            sum: 0.0,
            below: 0.0,
            above: 0.0,
            min: 0.0,
        }
    }

    /// Number of bins.
    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    /// Lowest border.
    pub fn lower(&self) -> f64 {
        self.borders.first().copied().unwrap_or(0.0)
    }

    /// Highest border.
    pub fn upper(&self) -> f64 {
        self.borders.last().copied().unwrap_or(0.0)
    }

    /// Whether `value` lies within `[lower, upper]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower() && value <= self.upper()
    }

    /// Bin holding `value`, if any.
    pub fn bin(&self, value: f64) -> Option<usize> {
        if !self.contains(value) || self.counts.is_empty() {
            return None;
        }
        let idx = self.borders.partition_point(|b| *b <= value);
        Some(idx.saturating_sub(1).min(self.counts.len() - 1))
    }

    /// Adds `weight` to the bin of `value`; values outside go to the overflow counters.
    pub fn add(&mut self, value: f64, weight: f64) {
        let Some(idx) = self.bin(value) else {
            if value < self.lower() {
                self.below += weight;
            } else {
                self.above += weight;
            }
            return;
        };
        let before = self.counts[idx];
        self.counts[idx] += weight;
        self.total += 1;
        self.sum += weight;
        if before == self.min {
            self.min = self.counts.iter().copied().fold(f64::INFINITY, f64::min);
        }
    }

    /// Smallest bin content.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Mean bin content.
    pub fn mean(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        self.sum / self.counts.len() as f64
    }

    /// Entries that landed in a bin.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Weight that fell below or above the range.
    pub fn overflow(&self) -> (f64, f64) {
        (self.below, self.above)
    }

    /// Every bin was visited at least once.
    pub fn all_visited(&self) -> bool {
        self.min > 0.0
    }

    /// Every bin was visited and the smallest holds at least `criterion` times the mean.
    pub fn is_flat(&self, criterion: f64) -> bool {
        self.all_visited() && self.min >= criterion * self.mean()
    }

    /// Clears all bins and overflow counters.
    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0.0);
        self.total = 0;
        self.sum = 0.0;
        self.below = 0.0;
        self.above = 0.0;
        self.min = 0.0;
    }

    /// Bin borders.
    pub fn borders(&self) -> &[f64] {
        &self.borders
    }

    /// Bin centers.
    pub fn centers(&self) -> Vec<f64> {
        self.borders.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// Bin contents.
    pub fn values(&self) -> &[f64] {
        &self.counts
    }
}

/// Logarithmic density of states accumulated by Wang-Landau sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityOfStates {
    log_g: Histogram,
}

impl DensityOfStates {
    /// Density over explicit ascending `borders`, zero everywhere.
    pub fn from_borders(borders: Vec<f64>) -> Self {
        Self {
            log_g: Histogram::from_borders(borders),
        }
    }

    /// `ln g` of the bin holding `value`, or `None` outside the range.
    pub fn get(&self, value: f64) -> Option<f64> {
        self.log_g.bin(value).map(|idx| self.log_g.values()[idx])
    }

    /// Whether `value` is inside the range.
    pub fn contains(&self, value: f64) -> bool {
        self.log_g.contains(value)
    }

    /// Adds `lnf` to the bin holding `value`.
    pub fn add(&mut self, value: f64, lnf: f64) {
        self.log_g.add(value, lnf);
    }

    /// Metropolis acceptance of moving from `old` to `new` under the current estimate.
    pub fn acceptance(&self, old: f64, new: f64) -> f64 {
        match (self.get(old), self.get(new)) {
            (Some(g_old), Some(g_new)) => (g_old - g_new).exp().min(1.0),
            _ => 0.0,
        }
    }

    /// Removes residual bias with an entropic-sampling visit histogram:
    /// `ln g += ln(H / mean(H))` for every visited bin.
    pub fn apply_entropic_correction(&mut self, visits: &Histogram) {
        let mean = visits.mean();
        if mean <= 0.0 {
            return;
        }
        for (g, h) in self.log_g.counts.iter_mut().zip(visits.values()) {
            if *h > 0.0 {
                *g += (h / mean).ln();
            }
        }
    }

    /// Bin borders.
    pub fn borders(&self) -> &[f64] {
        self.log_g.borders()
    }

    /// Bin centers.
    pub fn centers(&self) -> Vec<f64> {
        self.log_g.centers()
    }

    /// Unnormalised `ln g` per bin.
    pub fn log_density(&self) -> &[f64] {
        self.log_g.values()
    }

    /// Clears the estimate.
    pub fn reset(&mut self) {
        self.log_g.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_border_falls_into_last_bin() {
        let h = Histogram::uniform(4, 0.0, 8.0);
        assert_eq!(h.bin(0.0), Some(0));
        assert_eq!(h.bin(1.999), Some(0));
        assert_eq!(h.bin(2.0), Some(1));
        assert_eq!(h.bin(8.0), Some(3));
        assert_eq!(h.bin(8.1), None);
        assert_eq!(h.bin(-0.1), None);
    }

    #[test]
    fn minimum_tracks_emptiest_bin() {
        let mut h = Histogram::uniform(3, 0.0, 3.0);
        h.add(0.5, 1.0);
        h.add(1.5, 1.0);
        assert_eq!(h.min(), 0.0);
        assert!(!h.all_visited());
        h.add(2.5, 1.0);
        assert_eq!(h.min(), 1.0);
        h.add(2.5, 1.0);
        assert_eq!(h.min(), 1.0);
        assert!(h.is_flat(0.7));
        assert!(!h.is_flat(0.8));
        h.add(-1.0, 2.0);
        assert_eq!(h.overflow(), (2.0, 0.0));
        h.reset();
        assert_eq!(h.total(), 0);
        assert_eq!(h.min(), 0.0);
    }

    #[test]
    fn irregular_borders() {
        let h = Histogram::from_borders(vec![0.0, 1.0, 5.0, 6.0]);
        assert_eq!(h.bin(4.9), Some(1));
        assert_eq!(h.centers(), vec![0.5, 3.0, 5.5]);
    }

    #[test]
    fn entropic_correction_flattens_bias() {
        let mut g = DensityOfStates::from_borders(vec![0.0, 1.0, 2.0]);
        let mut visits = Histogram::from_borders(vec![0.0, 1.0, 2.0]);
        visits.add(0.5, 3.0);
        visits.add(1.5, 1.0);
        g.apply_entropic_correction(&visits);
        assert!((g.log_density()[0] - 1.5f64.ln()).abs() < 1e-12);
        assert!((g.log_density()[1] - 0.5f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn moves_out_of_range_are_never_accepted() {
        let g = DensityOfStates::from_borders(vec![0.0, 1.0]);
        assert_eq!(g.acceptance(0.5, 2.0), 0.0);
        assert_eq!(g.acceptance(0.5, 0.7), 1.0);
    }
}

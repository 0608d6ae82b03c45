//! Shape diagnostics reported next to the hull observables.

use std::collections::HashSet;

use rwch_core::{cross2d_z, Step};
use serde::{Deserialize, Serialize};

use crate::walk::Walk;

/// Snapshot of every per-row diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Hull surface.
    pub l: f64,
    /// Hull volume.
    pub a: f64,
    /// End-to-end distance.
    pub r: f64,
    /// Squared end-to-end distance.
    pub r2: f64,
    /// Largest distance between two hull vertices.
    pub max_diameter: f64,
    /// x component of start minus end.
    pub rx: f64,
    /// y component of start minus end.
    pub ry: f64,
    /// Number of hull vertices.
    pub num_on_hull: usize,
    /// Longest hull diameter over twice the largest extent perpendicular to it.
    pub oblateness: f64,
    /// First sign change of x after the origin, or -1.
    pub passage: i64,
    /// Summed step lengths.
    pub length: f64,
    /// Distinct lattice sites on the trace, -1 off the lattice.
    pub visited_sites: i64,
    /// Lattice sites cut off from the outside by the trace, -1 off the lattice.
    pub enclosed_sites: i64,
}

impl Walk {
    /// End-to-end distance.
    pub fn r(&self) -> f64 {
        match (self.trace.first(), self.trace.last()) {
            (Some(first), Some(last)) => first.dist(last),
            _ => 0.0,
        }
    }

    /// Squared end-to-end distance.
    pub fn r2(&self) -> f64 {
        let r = self.r();
        r * r
    }

    /// x component of `trace[0] - trace[n]`.
    pub fn rx(&self) -> f64 {
        self.end_to_end(0)
    }

    /// y component of `trace[0] - trace[n]`.
    pub fn ry(&self) -> f64 {
        self.end_to_end(1)
    }

    fn end_to_end(&self, axis: usize) -> f64 {
        match (self.trace.first(), self.trace.last()) {
            (Some(first), Some(last)) => first[axis] - last[axis],
            _ => 0.0,
        }
    }

    /// Largest pairwise distance between hull vertices.
    pub fn max_diameter(&mut self) -> f64 {
        let vertices = self.hull_vertices();
        let mut best = 0.0f64;
        for (i, p) in vertices.iter().enumerate() {
            for q in &vertices[..i] {
                best = best.max(p.dist(q));
            }
        }
        best
    }

    /// Ratio of the longest hull diameter to twice the widest extent
    /// perpendicular to it; 1 for a disc. Uses the first two coordinates.
    pub fn oblateness(&mut self) -> f64 {
        let vertices = self.hull_vertices();
        let (mut long, mut far) = (0.0f64, (0, 0));
        for i in 0..vertices.len() {
            for j in 0..i {
                let diameter = vertices[i].dist(&vertices[j]);
                if diameter > long {
                    long = diameter;
                    far = (i, j);
                }
            }
        }
        if vertices.is_empty() {
            return f64::NAN;
        }

        let (a, b) = (&vertices[far.0], &vertices[far.1]);
        let cross = vertices
            .iter()
            .map(|p| cross2d_z(a, p, b).abs())
            .fold(0.0f64, f64::max);
        let short = cross / a.dist(b);
        long / short / 2.0
    }

    /// Number of distinct hull vertices.
    pub fn num_on_hull(&mut self) -> usize {
        self.hull().map_or(0, |hull| hull.num_vertices())
    }

    /// First step after `t1` at which coordinate `axis` changes sign, or -1.
    ///
    /// Leading zeros are skipped to find the starting sign; later zeros do not
    /// count as a change.
    pub fn passage(&self, t1: usize, axis: usize) -> i64 {
        let n = self.params.steps;
        let sign = |t: usize| {
            let c = self.trace[t][axis];
            if c > 0.0 {
                1
            } else if c < 0.0 {
                -1
            } else {
                0
            }
        };

        let mut t = t1;
        if t >= n {
            return -1;
        }
        let mut start = sign(t);
        while start == 0 {
            t += 1;
            if t >= n {
                return -1;
            }
            start = sign(t);
        }
        ((t + 1)..n)
            .find(|&i| {
                let s = sign(i);
                s != 0 && s != start
            })
            .map_or(-1, |i| i as i64)
    }

    /// Total length of all steps; equals the step count on the lattice.
    pub fn length(&self) -> f64 {
        self.steps.iter().map(Step::length).sum()
    }

    fn lattice_sites(&self) -> HashSet<Vec<i64>> {
        self.trace
            .iter()
            .map(|p| p.as_slice().iter().map(|c| c.round() as i64).collect())
            .collect()
    }

    /// Number of distinct sites visited, or -1 for off-lattice walks.
    pub fn visited_sites(&self) -> i64 {
        if !self.params.kind.is_lattice() {
            return -1;
        }
        self.lattice_sites().len() as i64
    }

    /// Sites of the bounding box, grown by one in every direction, that cannot
    /// be reached from its corner without crossing the trace. Visited sites
    /// count as enclosed. -1 for off-lattice walks.
    pub fn enclosed_sites(&self) -> i64 {
        if !self.params.kind.is_lattice() {
            return -1;
        }
        let visited = self.lattice_sites();
        let d = self.params.dimension;
        let (mut lo, mut hi) = (vec![0i64; d], vec![0i64; d]);
        for site in &visited {
            for k in 0..d {
                lo[k] = lo[k].min(site[k] - 1);
                hi[k] = hi[k].max(site[k] + 1);
            }
        }
        let size: i64 = lo.iter().zip(&hi).map(|(l, h)| h - l + 1).product();

        let mut reached = HashSet::from([hi.clone()]);
        let mut stack = vec![hi.clone()];
        while let Some(site) = stack.pop() {
            for k in 0..d {
                for delta in [-1, 1] {
                    let mut next = site.clone();
                    next[k] += delta;
                    if next[k] < lo[k] || next[k] > hi[k] || visited.contains(&next) || reached.contains(&next) {
                        continue;
                    }
                    reached.insert(next.clone());
                    stack.push(next);
                }
            }
        }
        size - reached.len() as i64
    }

    /// Every diagnostic at once.
    pub fn diagnostics(&mut self) -> Diagnostics {
        Diagnostics {
            l: self.l(),
            a: self.a(),
            r: self.r(),
            r2: self.r2(),
            max_diameter: self.max_diameter(),
            rx: self.rx(),
            ry: self.ry(),
            num_on_hull: self.num_on_hull(),
            oblateness: self.oblateness(),
            passage: self.passage(0, 0),
            length: self.length(),
            visited_sites: self.visited_sites(),
            enclosed_sites: self.enclosed_sites(),
        }
    }
}

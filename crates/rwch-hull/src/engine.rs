//! Hull engine: algorithm selection, degenerate-dimension handling and results.

use rwch_core::{ErrorInfo, RwchError, Step};
use serde::{Deserialize, Serialize};

use crate::akl::{cull_2d, cull_3d};
use crate::andrew::andrew;
use crate::faces::triangulate;
use crate::geometry::{
    close_from_lowest, coordinate_scale, polygon_area, polygon_perimeter, prune_collinear, sort_by_angle,
};
use crate::jarvis::jarvis;
use crate::quickhull::{quickhull, KernelError, KernelHull, PointSet};

/// Hull algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HullAlgorithm {
    /// General-dimension quickhull kernel.
    Library,
    /// Andrew's monotone chain, d = 2 only.
    Andrew,
    /// Jarvis march, d = 2 only.
    Jarvis,
    /// Skip hull construction; observables are reported as zero.
    Nop,
}

impl Default for HullAlgorithm {
    fn default() -> Self {
        HullAlgorithm::Library
    }
}

impl HullAlgorithm {
    /// Whether the algorithm handles points of dimension `d`.
    pub fn supports(self, d: usize) -> bool {
        match self {
            HullAlgorithm::Library | HullAlgorithm::Nop => d >= 2,
            HullAlgorithm::Andrew | HullAlgorithm::Jarvis => d == 2,
        }
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            HullAlgorithm::Library => "library",
            HullAlgorithm::Andrew => "andrew",
            HullAlgorithm::Jarvis => "jarvis",
            HullAlgorithm::Nop => "nop",
        }
    }
}

/// Algorithm plus culling switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HullOptions {
    /// Algorithm used for full-rank point sets.
    pub algorithm: HullAlgorithm,
    /// Discard interior points with the Akl–Toussaint heuristic first.
    #[serde(alias = "cull")]
    pub akl_toussaint: bool,
}

impl HullOptions {
    /// Options for `algorithm` without culling.
    pub fn new(algorithm: HullAlgorithm) -> Self {
        Self {
            algorithm,
            akl_toussaint: false,
        }
    }

    /// Enables or disables culling.
    pub fn with_culling(mut self, enabled: bool) -> Self {
        self.akl_toussaint = enabled;
        self
    }

    /// Rejects combinations that cannot run in dimension `d`.
    pub fn check(&self, d: usize) -> Result<(), RwchError> {
        if !self.algorithm.supports(d) {
            return Err(RwchError::Unsupported(
                ErrorInfo::new(
                    "hull-dimension",
                    format!("{} hull does not support dimension {d}", self.algorithm.name()),
                )
                .with_context("algorithm", self.algorithm.name())
                .with_context("dimension", d.to_string())
                .with_hint("use the library kernel outside two dimensions"),
            ));
        }
        if self.akl_toussaint && d > 3 && self.algorithm != HullAlgorithm::Nop {
            return Err(RwchError::Unsupported(
                ErrorInfo::new(
                    "hull-culling-dimension",
                    format!("Akl-Toussaint culling is only available for d <= 3, got {d}"),
                )
                .with_context("dimension", d.to_string())
                .with_hint("disable akl_toussaint"),
            ));
        }
        Ok(())
    }
}

/// How the point set was classified before measuring it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "kebab-case")]
pub enum HullShape {
    /// Full-rank hull.
    Full,
    /// All points coincide along at least two axes, or span less than a hyperplane.
    Collapsed,
    /// The points span a hyperplane; `dropped` names the constant axis when
    /// the hyperplane is axis aligned.
    Flat {
        /// Constant axis, if any.
        dropped: Option<usize>,
    },
    /// Construction failed numerically; observables are NaN.
    Undefined,
    /// No hull was computed.
    Skipped,
}

/// Convex hull of a point set and its two observables.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull {
    dimension: usize,
    shape: HullShape,
    vertices: Vec<Step<f64>>,
    faces: Vec<[Step<f64>; 3]>,
    surface: f64,
    volume: f64,
}

impl ConvexHull {
    fn degenerate(dimension: usize, shape: HullShape, vertices: Vec<Step<f64>>, surface: f64) -> Self {
        Self {
            dimension,
            shape,
            vertices,
            faces: Vec::new(),
            surface,
            volume: 0.0,
        }
    }

    /// Hull whose observables could not be computed.
    pub fn undefined(dimension: usize) -> Self {
        Self {
            dimension,
            shape: HullShape::Undefined,
            vertices: Vec::new(),
            faces: Vec::new(),
            surface: f64::NAN,
            volume: f64::NAN,
        }
    }

    /// Perimeter in 2-D, surface measure otherwise.
    pub fn l(&self) -> f64 {
        self.surface
    }

    /// Enclosed area in 2-D, volume otherwise.
    pub fn a(&self) -> f64 {
        self.volume
    }

    /// Dimension of the input points.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Classification of the input.
    pub fn shape(&self) -> HullShape {
        self.shape
    }

    /// Hull vertices. In 2-D a closed counterclockwise polygon whose first
    /// vertex is repeated at the end.
    pub fn vertices(&self) -> &[Step<f64>] {
        &self.vertices
    }

    /// Number of distinct hull vertices.
    pub fn num_vertices(&self) -> usize {
        let closed = self.dimension == 2 && self.vertices.len() > 1 && self.vertices.first() == self.vertices.last();
        if closed {
            self.vertices.len() - 1
        } else {
            self.vertices.len()
        }
    }

    /// Outward-oriented surface triangles of a full-rank 3-D hull.
    pub fn faces(&self) -> &[[Step<f64>; 3]] {
        &self.faces
    }
}

/// Computes hulls with a fixed set of options, reusing scratch buffers.
#[derive(Debug, Clone, Default)]
pub struct HullEngine {
    options: HullOptions,
    coords: Vec<f64>,
}

impl HullEngine {
    /// Engine for `options`.
    pub fn new(options: HullOptions) -> Self {
        Self {
            options,
            coords: Vec::new(),
        }
    }

    /// Configured options.
    pub fn options(&self) -> HullOptions {
        self.options
    }

    /// Hull of `points`, all of one dimension `d >= 2`.
    pub fn compute(&mut self, points: &[Step<f64>]) -> Result<ConvexHull, RwchError> {
        let Some(first) = points.first() else {
            return Ok(ConvexHull::degenerate(0, HullShape::Collapsed, Vec::new(), 0.0));
        };
        let d = first.dim();
        self.options.check(d)?;
        if self.options.algorithm == HullAlgorithm::Nop {
            return Ok(ConvexHull::degenerate(d, HullShape::Skipped, Vec::new(), 0.0));
        }

        let flat: Vec<usize> = (0..d).filter(|&k| points.iter().all(|p| p[k] == first[k])).collect();
        match flat.as_slice() {
            [] => Ok(self.full_rank(points, d)),
            [axis] if d == 2 => Ok(segment(points, 1 - axis, Some(*axis))),
            [axis] => Ok(self.drop_axis(points, *axis)),
            _ => Ok(ConvexHull::degenerate(
                d,
                HullShape::Collapsed,
                vec![first.clone()],
                0.0,
            )),
        }
    }

    fn drop_axis(&mut self, points: &[Step<f64>], axis: usize) -> ConvexHull {
        let d = points[0].dim();
        self.coords.clear();
        for p in points {
            self.coords
                .extend(p.as_slice().iter().enumerate().filter(|(k, _)| *k != axis).map(|(_, c)| *c));
        }
        match measure(PointSet::new(&self.coords, d - 1)) {
            Some((volume, vertices)) => ConvexHull::degenerate(
                d,
                HullShape::Flat { dropped: Some(axis) },
                vertices.into_iter().map(|i| points[i].clone()).collect(),
                volume,
            ),
            None => {
                tracing::warn!(dimension = d, axis, "hull kernel failed on flat point set");
                ConvexHull::undefined(d)
            }
        }
    }

    fn full_rank(&mut self, points: &[Step<f64>], d: usize) -> ConvexHull {
        let candidates = match (self.options.akl_toussaint, d) {
            (true, 2) => cull_2d(points),
            (true, 3) => cull_3d(points),
            _ => points.to_vec(),
        };

        match self.options.algorithm {
            HullAlgorithm::Andrew => {
                let mut sorted = candidates;
                sorted.sort_by(|a, b| a.lex_cmp(b));
                polygon(andrew(&sorted))
            }
            HullAlgorithm::Jarvis => polygon(jarvis(&candidates)),
            _ => self.library(&candidates, d),
        }
    }

    fn library(&mut self, points: &[Step<f64>], d: usize) -> ConvexHull {
        self.coords.clear();
        self.coords.extend(points.iter().flat_map(|p| p.as_slice().iter().copied()));
        let set = PointSet::new(&self.coords, d);

        match quickhull(set) {
            Ok(hull) if d == 2 => {
                let scale = coordinate_scale(points);
                let mut cycle: Vec<Step<f64>> = hull.vertices.iter().map(|&i| points[i].clone()).collect();
                sort_by_angle(&mut cycle);
                prune_collinear(&mut cycle, hull.eps * scale);
                ConvexHull {
                    dimension: 2,
                    shape: HullShape::Full,
                    vertices: close_from_lowest(cycle),
                    faces: Vec::new(),
                    surface: hull.surface,
                    volume: hull.volume,
                }
            }
            Ok(hull) if d == 3 => {
                let tri = triangulate(&hull, set);
                ConvexHull {
                    dimension: 3,
                    shape: HullShape::Full,
                    vertices: tri.corners.iter().map(|&i| points[i].clone()).collect(),
                    faces: tri.triangles,
                    surface: tri.area,
                    volume: hull.volume,
                }
            }
            Ok(KernelHull {
                vertices,
                surface,
                volume,
                ..
            }) => ConvexHull {
                dimension: d,
                shape: HullShape::Full,
                vertices: vertices.into_iter().map(|i| points[i].clone()).collect(),
                faces: Vec::new(),
                surface,
                volume,
            },
            Err(KernelError::RankDeficient { rank, origin, basis }) => {
                lower_rank(points, d, rank, &points[origin], &basis)
            }
            Err(KernelError::Numerical(message)) => {
                tracing::warn!(dimension = d, points = points.len(), %message, "hull kernel failed");
                ConvexHull::undefined(d)
            }
        }
    }
}

/// Points spanning a tilted affine subspace: measured inside that subspace.
fn lower_rank(points: &[Step<f64>], d: usize, rank: usize, origin: &Step<f64>, basis: &[Vec<f64>]) -> ConvexHull {
    if rank + 1 < d {
        return ConvexHull::degenerate(d, HullShape::Collapsed, vec![origin.clone()], 0.0);
    }
    let coords: Vec<f64> = points
        .iter()
        .flat_map(|p| {
            let rel: Vec<f64> = p.as_slice().iter().zip(origin.as_slice()).map(|(a, b)| a - b).collect();
            basis
                .iter()
                .map(move |b| rel.iter().zip(b).map(|(x, y)| x * y).sum::<f64>())
        })
        .collect();
    match measure(PointSet::new(&coords, rank)) {
        Some((volume, vertices)) => {
            let mut hull_vertices: Vec<Step<f64>> = vertices.into_iter().map(|i| points[i].clone()).collect();
            if d == 2 {
                hull_vertices = close_from_lowest(hull_vertices);
            }
            // segments in the plane count both sides; higher flat bodies report their (d-1)-volume once
            let surface = if d == 2 { 2.0 * volume } else { volume };
            ConvexHull::degenerate(d, HullShape::Flat { dropped: None }, hull_vertices, surface)
        }
        None => {
            tracing::warn!(dimension = d, rank, "hull kernel failed on lower-rank point set");
            ConvexHull::undefined(d)
        }
    }
}

/// Measure and vertex indices of the hull of `set` in its own dimension.
///
/// Returns zero volume for rank-deficient input and `None` on kernel failure.
fn measure(set: PointSet<'_>) -> Option<(f64, Vec<usize>)> {
    if set.is_empty() {
        return Some((0.0, Vec::new()));
    }
    if set.dim() == 1 {
        let key = |i: &usize| set.point(*i)[0];
        let lo = (0..set.len()).min_by(|a, b| key(a).total_cmp(&key(b)))?;
        let hi = (0..set.len()).max_by(|a, b| key(a).total_cmp(&key(b)))?;
        return Some((key(&hi) - key(&lo), vec![lo, hi]));
    }
    match quickhull(set) {
        Ok(hull) => Some((hull.volume, hull.vertices)),
        Err(KernelError::RankDeficient { origin, .. }) => Some((0.0, vec![origin])),
        Err(KernelError::Numerical(_)) => None,
    }
}

/// Two-dimensional points sharing one coordinate: a segment along `axis`.
fn segment(points: &[Step<f64>], axis: usize, dropped: Option<usize>) -> ConvexHull {
    let lo = points
        .iter()
        .min_by(|a, b| a[axis].total_cmp(&b[axis]))
        .cloned()
        .unwrap_or_default();
    let hi = points
        .iter()
        .max_by(|a, b| a[axis].total_cmp(&b[axis]))
        .cloned()
        .unwrap_or_default();
    let span = hi[axis] - lo[axis];
    ConvexHull::degenerate(
        2,
        HullShape::Flat { dropped },
        vec![lo.clone(), hi, lo],
        2.0 * span,
    )
}

fn polygon(closed: Vec<Step<f64>>) -> ConvexHull {
    ConvexHull {
        dimension: 2,
        shape: HullShape::Full,
        surface: polygon_perimeter(&closed),
        volume: polygon_area(&closed),
        vertices: closed,
        faces: Vec::new(),
    }
}

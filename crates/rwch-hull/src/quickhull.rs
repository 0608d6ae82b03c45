//! General-dimension quickhull used as the library kernel.
//!
//! Points are read from a flat coordinate buffer. The kernel returns simplicial
//! facets with outward unit normals plus the enclosed volume and the surface
//! measure. Point sets that do not span the full dimension are reported as
//! [`KernelError::RankDeficient`] together with an orthonormal basis of their
//! affine hull so the caller can retry in the reduced space.

use std::collections::BTreeMap;

use nalgebra::DMatrix;

/// Flat view of `len` points of dimension `dim`.
#[derive(Debug, Clone, Copy)]
pub struct PointSet<'a> {
    coords: &'a [f64],
    dim: usize,
}

impl<'a> PointSet<'a> {
    /// Wraps `coords`, whose length must be a multiple of `dim`.
    pub fn new(coords: &'a [f64], dim: usize) -> Self {
        Self { coords, dim }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.coords.len() / self.dim
        }
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension of each point.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Coordinates of point `i`.
    pub fn point(&self, i: usize) -> &'a [f64] {
        &self.coords[i * self.dim..(i + 1) * self.dim]
    }

    fn scale(&self) -> f64 {
        self.coords.iter().fold(1.0f64, |acc, c| acc.max(c.abs()))
    }
}

/// A simplicial facet of the hull.
#[derive(Debug, Clone)]
pub struct Facet {
    /// Indices of the `dim` points spanning the facet.
    pub vertices: Vec<usize>,
    /// Outward unit normal.
    pub normal: Vec<f64>,
    /// Plane offset, `normal . x = offset` on the facet.
    pub offset: f64,
    outside: Vec<usize>,
    alive: bool,
}

impl Facet {
    /// Signed distance of `p` from the facet plane, positive outside.
    pub fn distance(&self, p: &[f64]) -> f64 {
        dot(&self.normal, p) - self.offset
    }
}

/// Result of a successful kernel run.
#[derive(Debug, Clone)]
pub struct KernelHull {
    /// Live facets.
    pub facets: Vec<Facet>,
    /// Sorted, de-duplicated indices of points that are facet vertices.
    pub vertices: Vec<usize>,
    /// Enclosed `dim`-volume.
    pub volume: f64,
    /// `(dim - 1)`-measure of the boundary.
    pub surface: f64,
    /// Absolute tolerance used for plane tests.
    pub eps: f64,
}

/// Ways the kernel can decline to build a hull.
#[derive(Debug, Clone)]
pub enum KernelError {
    /// The points span an affine subspace of dimension `rank < dim`.
    RankDeficient {
        /// Dimension of the affine hull.
        rank: usize,
        /// Index of the point used as the affine origin.
        origin: usize,
        /// Orthonormal basis of the affine hull's direction space.
        basis: Vec<Vec<f64>>,
    },
    /// Float trouble produced a degenerate facet.
    Numerical(String),
}

/// Builds the convex hull of `points`.
pub fn quickhull(points: PointSet<'_>) -> Result<KernelHull, KernelError> {
    let d = points.dim();
    if d < 2 {
        return Err(KernelError::Numerical(format!("no hull kernel for dimension {d}")));
    }
    if points.is_empty() {
        return Err(KernelError::RankDeficient {
            rank: 0,
            origin: 0,
            basis: Vec::new(),
        });
    }

    let eps = 1e-9 * points.scale();
    let (simplex, basis) = initial_simplex(points, eps);
    if basis.len() < d {
        return Err(KernelError::RankDeficient {
            rank: basis.len(),
            origin: simplex[0],
            basis,
        });
    }

    let interior: Vec<f64> = (0..d)
        .map(|k| simplex.iter().map(|&i| points.point(i)[k]).sum::<f64>() / (d + 1) as f64)
        .collect();

    let mut facets: Vec<Facet> = Vec::with_capacity(4 * d);
    for skip in 0..=d {
        let verts: Vec<usize> = simplex
            .iter()
            .enumerate()
            .filter(|(k, _)| *k != skip)
            .map(|(_, &i)| i)
            .collect();
        facets.push(make_facet(points, verts, &interior)?);
    }

    for i in 0..points.len() {
        if simplex.contains(&i) {
            continue;
        }
        let p = points.point(i);
        if let Some(f) = facets.iter_mut().find(|f| f.distance(p) > eps) {
            f.outside.push(i);
        }
    }

    while let Some(fi) = facets.iter().position(|f| f.alive && !f.outside.is_empty()) {
        let apex = furthest_outside(&facets[fi], points);
        let apex_point = points.point(apex);

        let visible: Vec<usize> = facets
            .iter()
            .enumerate()
            .filter(|(_, f)| f.alive && f.distance(apex_point) > eps)
            .map(|(k, _)| k)
            .collect();

        let mut ridges: BTreeMap<Vec<usize>, (usize, Vec<usize>)> = BTreeMap::new();
        let mut orphans: Vec<usize> = Vec::new();
        for &k in &visible {
            let facet = &mut facets[k];
            facet.alive = false;
            orphans.append(&mut facet.outside);
            for skip in 0..d {
                let ridge: Vec<usize> = facet
                    .vertices
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != skip)
                    .map(|(_, &v)| v)
                    .collect();
                let mut key = ridge.clone();
                key.sort_unstable();
                ridges.entry(key).or_insert((0, ridge)).0 += 1;
            }
        }

        let first_new = facets.len();
        for (count, ridge) in ridges.into_values() {
            if count != 1 {
                continue;
            }
            let mut verts = ridge;
            verts.push(apex);
            facets.push(make_facet(points, verts, &interior)?);
        }

        for q in orphans {
            if q == apex {
                continue;
            }
            let p = points.point(q);
            let target = (first_new..facets.len())
                .find(|&k| facets[k].distance(p) > eps)
                .or_else(|| (0..first_new).find(|&k| facets[k].alive && facets[k].distance(p) > eps));
            if let Some(k) = target {
                facets[k].outside.push(q);
            }
        }
    }

    facets.retain(|f| f.alive);

    let mut vertices: Vec<usize> = facets.iter().flat_map(|f| f.vertices.iter().copied()).collect();
    vertices.sort_unstable();
    vertices.dedup();

    let factorial_d: f64 = (1..=d).map(|k| k as f64).product();
    let factorial_dm1: f64 = factorial_d / d as f64;
    let volume = facets
        .iter()
        .map(|f| pyramid_determinant(points, &f.vertices, &interior).abs())
        .sum::<f64>()
        / factorial_d;
    let surface = facets
        .iter()
        .map(|f| gram_measure(points, &f.vertices))
        .sum::<f64>()
        / factorial_dm1;

    Ok(KernelHull {
        facets,
        vertices,
        volume,
        surface,
        eps,
    })
}

fn initial_simplex(points: PointSet<'_>, eps: f64) -> (Vec<usize>, Vec<Vec<f64>>) {
    let d = points.dim();
    let origin = (0..points.len())
        .min_by(|&a, &b| {
            points
                .point(a)
                .iter()
                .zip(points.point(b))
                .map(|(x, y)| x.total_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(0);
    let base = points.point(origin);

    let mut simplex = vec![origin];
    let mut basis: Vec<Vec<f64>> = Vec::with_capacity(d);
    while basis.len() < d {
        let mut best: Option<(usize, f64, Vec<f64>)> = None;
        for i in 0..points.len() {
            let mut residual: Vec<f64> = points.point(i).iter().zip(base).map(|(p, o)| p - o).collect();
            for b in &basis {
                let proj = dot(&residual, b);
                residual.iter_mut().zip(b).for_each(|(r, bk)| *r -= proj * bk);
            }
            let norm = dot(&residual, &residual).sqrt();
            if best.as_ref().map_or(true, |(_, n, _)| norm > *n) {
                best = Some((i, norm, residual));
            }
        }
        match best {
            Some((i, norm, residual)) if norm > eps => {
                simplex.push(i);
                basis.push(residual.into_iter().map(|r| r / norm).collect());
            }
            _ => break,
        }
    }
    (simplex, basis)
}

fn make_facet(points: PointSet<'_>, vertices: Vec<usize>, interior: &[f64]) -> Result<Facet, KernelError> {
    let d = points.dim();
    let anchor = points.point(vertices[0]);
    let edges = DMatrix::from_fn(d - 1, d, |r, c| points.point(vertices[r + 1])[c] - anchor[c]);

    let mut normal: Vec<f64> = (0..d)
        .map(|j| {
            let minor = edges.clone().remove_column(j);
            let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
            sign * minor.determinant()
        })
        .collect();
    let norm = dot(&normal, &normal).sqrt();
    if !(norm > f64::MIN_POSITIVE) {
        return Err(KernelError::Numerical(format!(
            "degenerate facet spanned by points {vertices:?}"
        )));
    }
    normal.iter_mut().for_each(|n| *n /= norm);
    let mut offset = dot(&normal, anchor);
    if dot(&normal, interior) - offset > 0.0 {
        normal.iter_mut().for_each(|n| *n = -*n);
        offset = -offset;
    }

    Ok(Facet {
        vertices,
        normal,
        offset,
        outside: Vec::new(),
        alive: true,
    })
}

fn furthest_outside(facet: &Facet, points: PointSet<'_>) -> usize {
    let mut best = facet.outside[0];
    let mut best_dist = f64::NEG_INFINITY;
    for &i in &facet.outside {
        let dist = facet.distance(points.point(i));
        if dist > best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

fn pyramid_determinant(points: PointSet<'_>, vertices: &[usize], apex: &[f64]) -> f64 {
    let d = points.dim();
    DMatrix::from_fn(d, d, |r, c| points.point(vertices[r])[c] - apex[c]).determinant()
}

fn gram_measure(points: PointSet<'_>, vertices: &[usize]) -> f64 {
    let d = points.dim();
    let anchor = points.point(vertices[0]);
    let edges = DMatrix::from_fn(d - 1, d, |r, c| points.point(vertices[r + 1])[c] - anchor[c]);
    let gram = &edges * edges.transpose();
    gram.determinant().max(0.0).sqrt()
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

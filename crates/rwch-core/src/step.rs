//! Fixed-dimension integer and real vectors used as steps and trace points.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Scalar types a [`Step`] can be built from.
pub trait Coord:
    Copy
    + Default
    + Debug
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + Send
    + Sync
    + 'static
{
    /// Lossless (for the ranges used here) conversion to `f64`.
    fn to_f64(self) -> f64;
}

impl Coord for i64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Coord for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

/// A d-dimensional displacement or point.
///
/// Integer steps order lexicographically and hash by value, which is what the
/// overlap checks of self-avoiding walks rely on. Real steps use
/// [`Step::lex_cmp`] for the same ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Step<T> {
    coords: Vec<T>,
}

/// A point of a trace. Points and steps share one algebra.
pub type Point<T> = Step<T>;

impl<T: Coord> Step<T> {
    /// The origin of dimension `d`.
    pub fn zero(d: usize) -> Self {
        Self {
            coords: vec![T::default(); d],
        }
    }

    /// Wraps explicit coordinates.
    pub fn from_vec(coords: Vec<T>) -> Self {
        Self { coords }
    }

    /// Dimension of the vector.
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// First coordinate.
    pub fn x(&self) -> T {
        self.coords[0]
    }

    /// Second coordinate.
    pub fn y(&self) -> T {
        self.coords[1]
    }

    /// Coordinates as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.coords
    }

    /// Resets every coordinate to zero.
    pub fn set_zero(&mut self) {
        self.coords.iter_mut().for_each(|c| *c = T::default());
    }

    /// Scalar product.
    pub fn dot(&self, other: &Self) -> T {
        self.coords
            .iter()
            .zip(&other.coords)
            .fold(T::default(), |acc, (&a, &b)| acc + a * b)
    }

    /// Euclidean norm.
    pub fn length(&self) -> f64 {
        self.dot(self).to_f64().sqrt()
    }

    /// Euclidean distance to `other`.
    pub fn dist(&self, other: &Self) -> f64 {
        self.coords
            .iter()
            .zip(&other.coords)
            .map(|(&a, &b)| {
                let d = (a - b).to_f64();
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Real-valued copy of this vector.
    pub fn to_f64(&self) -> Step<f64> {
        Step {
            coords: self.coords.iter().map(|c| c.to_f64()).collect(),
        }
    }

    /// Lexicographic order that is total even for real coordinates.
    pub fn lex_cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.coords.iter().zip(&other.coords) {
            let ord = a.to_f64().total_cmp(&b.to_f64());
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.coords.len().cmp(&other.coords.len())
    }
}

impl Step<i64> {
    /// Unit step of the hypercubic lattice selected by a uniform number.
    ///
    /// `u` in `[0, 1)` is split into `2d` equal intervals: `+e_0, -e_0, +e_1, ...`.
    pub fn lattice(d: usize, u: f64) -> Self {
        let scaled = u * d as f64;
        let axis = (scaled.max(0.0) as usize).min(d - 1);
        let mut step = Self::zero(d);
        step.coords[axis] = if scaled - (axis as f64) < 0.5 { 1 } else { -1 };
        step
    }

    /// Canonical uniform number that maps back onto this unit step.
    pub fn lattice_uniform(&self) -> Option<f64> {
        let d = self.dim() as f64;
        let mut found = None;
        for (axis, &c) in self.coords.iter().enumerate() {
            match (c, found) {
                (0, _) => {}
                (1, None) => found = Some((axis as f64 + 0.25) / d),
                (-1, None) => found = Some((axis as f64 + 0.75) / d),
                _ => return None,
            }
        }
        found
    }
}

impl Step<f64> {
    /// Cross product of two 3-D vectors.
    pub fn cross3(&self, other: &Self) -> Self {
        let (a, b) = (&self.coords, &other.coords);
        Self {
            coords: vec![
                a[1] * b[2] - a[2] * b[1],
                a[2] * b[0] - a[0] * b[2],
                a[0] * b[1] - a[1] * b[0],
            ],
        }
    }

    /// Multiplies every coordinate by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            coords: self.coords.iter().map(|c| c * factor).collect(),
        }
    }
}

/// z component of `(b - a) x (c - a)` using the first two coordinates.
///
/// Positive when `a -> b -> c` turns counterclockwise.
pub fn cross2d_z<T: Coord>(a: &Step<T>, b: &Step<T>, c: &Step<T>) -> f64 {
    let (ax, ay) = (a.x().to_f64(), a.y().to_f64());
    (b.x().to_f64() - ax) * (c.y().to_f64() - ay) - (b.y().to_f64() - ay) * (c.x().to_f64() - ax)
}

impl<T> Index<usize> for Step<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.coords[index]
    }
}

impl<T> IndexMut<usize> for Step<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.coords[index]
    }
}

impl<T: Coord> AddAssign<&Step<T>> for Step<T> {
    fn add_assign(&mut self, rhs: &Step<T>) {
        for (a, &b) in self.coords.iter_mut().zip(&rhs.coords) {
            *a += b;
        }
    }
}

impl<T: Coord> SubAssign<&Step<T>> for Step<T> {
    fn sub_assign(&mut self, rhs: &Step<T>) {
        for (a, &b) in self.coords.iter_mut().zip(&rhs.coords) {
            *a -= b;
        }
    }
}

impl<T: Coord> Add for &Step<T> {
    type Output = Step<T>;

    fn add(self, rhs: &Step<T>) -> Step<T> {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl<T: Coord> Sub for &Step<T> {
    type Output = Step<T>;

    fn sub(self, rhs: &Step<T>) -> Step<T> {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}

impl<T: Coord> Neg for &Step<T> {
    type Output = Step<T>;

    fn neg(self) -> Step<T> {
        Step {
            coords: self.coords.iter().map(|&c| -c).collect(),
        }
    }
}

//! Orthogonal symmetries of the hypercubic lattice used by pivot moves.

use rwch_core::Step;

/// A lattice symmetry acting on steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symmetry {
    /// Reflection `x_axis -> -x_axis`.
    Mirror(usize),
    /// Rotation by `quarters * 90` degrees in the plane spanned by axes `i < j`,
    /// turning `e_i` towards `e_j`.
    Rotate {
        /// First plane axis.
        i: usize,
        /// Second plane axis.
        j: usize,
        /// Quarter turns, 1 to 3.
        quarters: u8,
    },
}

impl Symmetry {
    /// Axis mirrors followed by the three rotations of every coordinate plane.
    pub fn all(d: usize) -> Vec<Symmetry> {
        let mut out: Vec<Symmetry> = (0..d).map(Symmetry::Mirror).collect();
        for i in 0..d {
            for j in i + 1..d {
                for quarters in 1..=3 {
                    out.push(Symmetry::Rotate { i, j, quarters });
                }
            }
        }
        out
    }

    /// Applies the symmetry to `step`.
    pub fn apply(&self, step: &Step<i64>) -> Step<i64> {
        let mut out = step.clone();
        match *self {
            Symmetry::Mirror(axis) => out[axis] = -step[axis],
            Symmetry::Rotate { i, j, quarters } => {
                let (x, y) = (step[i], step[j]);
                let (nx, ny) = match quarters % 4 {
                    1 => (-y, x),
                    2 => (-x, -y),
                    3 => (y, -x),
                    _ => (x, y),
                };
                out[i] = nx;
                out[j] = ny;
            }
        }
        out
    }

    /// The symmetry undoing this one.
    pub fn inverse(&self) -> Symmetry {
        match *self {
            Symmetry::Mirror(axis) => Symmetry::Mirror(axis),
            Symmetry::Rotate { i, j, quarters } => Symmetry::Rotate {
                i,
                j,
                quarters: (4 - quarters % 4) % 4,
            },
        }
    }
}

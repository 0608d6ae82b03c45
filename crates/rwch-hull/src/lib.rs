#![deny(missing_docs)]
#![doc = "Convex hull engine for random-walk traces: an n-dimensional quickhull kernel, Andrew's monotone chain, Jarvis march, Akl-Toussaint culling and closed-form handling of flat point sets."]

pub mod akl;
pub mod andrew;
pub mod engine;
pub mod faces;
pub mod geometry;
pub mod jarvis;
pub mod quickhull;

pub use engine::{ConvexHull, HullAlgorithm, HullEngine, HullOptions, HullShape};
pub use quickhull::{quickhull, KernelError, KernelHull, PointSet};

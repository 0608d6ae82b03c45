#![deny(missing_docs)]
#![doc = "Core types shared by the random-walk convex hull samplers: errors, seeded RNG streams, the step algebra and the logging context."]

pub mod errors;
pub mod log;
pub mod rng;
pub mod step;

pub use errors::{ErrorInfo, RwchError};
pub use log::{LogContext, Verbosity};
pub use rng::{derive_substream_seed, RngHandle};
pub use step::{cross2d_z, Coord, Point, Step};

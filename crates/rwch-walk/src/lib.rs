#![deny(missing_docs)]
#![doc = "Random walks built from a latent vector of random numbers, with reversible mutations, lazily rebuilt convex hulls, extremal constructions and a binary configuration log."]

pub mod degenerate;
pub mod diagnostics;
pub mod kind;
pub mod loop_erased;
pub mod observable;
pub mod persist;
pub mod pivot;
pub mod self_avoiding;
pub mod walk;

pub use degenerate::{Construction, DEFAULT_STAGNATION};
pub use diagnostics::Diagnostics;
pub use kind::{WalkKind, WalkParams};
pub use observable::Observable;
pub use persist::{read_configurations, ConfigurationRecord};
pub use walk::{ChangeOutcome, HullState, Walk};

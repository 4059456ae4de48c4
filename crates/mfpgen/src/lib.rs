//! Reproducible moving-firefighter tree instances.
//!
//! Pipeline
//! - `seeds`: one root entropy value spawns an independent generator per
//!   (tree size, instance) pair.
//! - `synth`: a generator and a node count produce a rooted random tree with a fixed
//!   ignition-vertex degree, its spring layout, the agent placed in an annulus around the
//!   ignition vertex, and the full symmetric distance matrix.
//!
//! The crate does no I/O; writers live in the `cli` crate.

pub mod error;
pub mod layout;
pub mod metric;
pub mod records;
pub mod seeds;
pub mod synth;
pub mod tree;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{GenError, Result};
pub use nalgebra::{DMatrix, Vector2 as Vec2};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::error::GenError;
    pub use crate::layout::{spring_layout, Layout, LayoutCfg};
    pub use crate::records::{SolverInput, SummaryRecord};
    pub use crate::seeds::{
        derive_batch, load_batch, parse_grid, BatchSeedRecord, Entropy, ExperimentBatch,
        InstanceGenerator, SeedLog,
    };
    pub use crate::synth::{synthesize, InstanceRecord, InstanceSummary, SynthCfg};
    pub use crate::tree::Tree;
    pub use nalgebra::{DMatrix, Vector2 as Vec2};
}

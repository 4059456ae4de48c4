//! Per-instance records handed to writers.
//!
//! Text layouts belong to the writer; these types only fix which fields exist.

use nalgebra::Vector2;

/// What the downstream solver needs to rebuild the instance.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverInput {
    pub dimension: usize,
    pub ignition: usize,
    pub agent: usize,
    /// `(index, coordinate)` for nodes `0..=dimension`.
    pub coords: Vec<(usize, Vector2<f64>)>,
    pub edges: Vec<(usize, usize)>,
}

/// Flat summary of one instance.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryRecord {
    pub tree_seed: u64,
    pub dimension: usize,
    pub ignition: usize,
    pub agent: usize,
    pub delta: f64,
    pub root_degree: usize,
    pub max_degree: usize,
    pub tree_height: usize,
    pub scale: f64,
}

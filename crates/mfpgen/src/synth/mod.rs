//! Instance synthesis: one generator in, one complete instance out.
//!
//! Draw order (part of the replay contract)
//! 1. ignition vertex, uniform in `[0, N-1)`;
//! 2. tree seeds until the sampled tree gives the ignition vertex `root_degree` neighbours
//!    (every rejection redraws a whole new tree);
//! 3. agent x magnitude, x sign, y magnitude, y sign.
//!
//! The layout is a pure function of the accepted tree seed, so it is computed once after
//! acceptance. The summary comes from the tree structure, never from the matrix.
//!
//! Code cross-refs: `tree::Tree`, `layout::spring_layout`, `metric::{distance_matrix,place_agent}`.

use crate::error::{GenError, Result};
use crate::layout::{spring_layout, Layout, LayoutCfg};
use crate::metric::{self, AgentPlacement, Annulus};
use crate::records::{SolverInput, SummaryRecord};
use crate::seeds::InstanceGenerator;
use crate::tree::Tree;
use nalgebra::{DMatrix, Vector2};

/// Instance parameters shared by a whole batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynthCfg {
    /// Edge-distance scale; the layout's largest absolute coordinate.
    pub scale: f64,
    /// Required degree of the ignition vertex.
    pub root_degree: usize,
    /// Agent offset band per axis, as fractions of `scale`.
    pub delta_low: f64,
    pub delta_high: f64,
}

impl Default for SynthCfg {
    fn default() -> Self {
        Self {
            scale: 1.0,
            root_degree: 3,
            delta_low: 0.25,
            delta_high: 0.50,
        }
    }
}

impl SynthCfg {
    /// Reject parameters that are malformed or that would never terminate for `n` nodes.
    pub fn validate(&self, n: usize) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(GenError::invalid("scale must be finite and > 0"));
        }
        if !(self.delta_low.is_finite() && self.delta_high.is_finite()) {
            return Err(GenError::invalid("delta bounds must be finite"));
        }
        if self.delta_low < 0.0 {
            return Err(GenError::invalid("delta_low must be >= 0"));
        }
        if self.delta_high <= self.delta_low {
            return Err(GenError::invalid("delta_high must exceed delta_low"));
        }
        if n < 2 {
            return Err(GenError::invalid(format!("need at least 2 nodes, got {n}")));
        }
        if self.root_degree == 0 {
            return Err(GenError::invalid("root_degree 0 is unreachable in a connected tree"));
        }
        if self.root_degree > n - 1 {
            return Err(GenError::invalid(format!(
                "root_degree {} is unreachable with {n} nodes",
                self.root_degree
            )));
        }
        let band = self.annulus();
        if !band.high.is_finite() || !(band.high - band.low).is_finite() {
            return Err(GenError::invalid("scaled delta band overflows"));
        }
        if band.low >= band.high {
            return Err(GenError::invalid("scaled delta band collapsed"));
        }
        Ok(())
    }

    pub fn annulus(&self) -> Annulus {
        Annulus {
            low: self.delta_low * self.scale,
            high: self.delta_high * self.scale,
        }
    }
}

/// Read-only statistics of one instance.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceSummary {
    pub tree_seed: u64,
    pub nodes: usize,
    pub ignition: usize,
    pub agent: usize,
    /// Euclidean ignition-to-agent distance.
    pub delta: f64,
    pub root_degree: usize,
    pub max_degree: usize,
    pub tree_height: usize,
    pub scale: f64,
    pub agent_position: Vector2<f64>,
    pub agent_offset: Vector2<f64>,
    /// Trees drawn and discarded before acceptance.
    pub rejected: u64,
}

/// Tree, layout (agent last), distance matrix and summary of one instance.
#[derive(Clone, Debug)]
pub struct InstanceRecord {
    tree: Tree,
    layout: Layout,
    distances: DMatrix<f64>,
    summary: InstanceSummary,
}

impl InstanceRecord {
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Coordinates of nodes `0..=N`; index `N` is the agent.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Symmetric `(N+1) x (N+1)` matrix.
    pub fn distances(&self) -> &DMatrix<f64> {
        &self.distances
    }

    pub fn summary(&self) -> &InstanceSummary {
        &self.summary
    }

    pub fn ignition(&self) -> usize {
        self.summary.ignition
    }

    pub fn agent(&self) -> usize {
        self.summary.agent
    }

    pub fn solver_input(&self) -> SolverInput {
        SolverInput {
            dimension: self.summary.nodes,
            ignition: self.summary.ignition,
            agent: self.summary.agent,
            coords: self.layout.iter().collect(),
            edges: self.tree.edges().to_vec(),
        }
    }

    pub fn summary_record(&self) -> SummaryRecord {
        let s = &self.summary;
        SummaryRecord {
            tree_seed: s.tree_seed,
            dimension: s.nodes,
            ignition: s.ignition,
            agent: s.agent,
            delta: s.delta,
            root_degree: s.root_degree,
            max_degree: s.max_degree,
            tree_height: s.tree_height,
            scale: s.scale,
        }
    }
}

/// Rejection-sample a tree until the ignition vertex has `cfg.root_degree` neighbours.
///
/// Returns `(ignition, tree_seed, tree, rejected)`.
fn sample_rooted_tree(
    cfg: &SynthCfg,
    n: usize,
    gen: &mut InstanceGenerator,
) -> Result<(usize, u64, Tree, u64)> {
    let ignition = gen.below(0, n - 1)?;
    let mut rejected = 0u64;
    loop {
        let seed = gen.tree_seed()?;
        let tree = Tree::random(n, seed);
        if tree.degree(ignition) == cfg.root_degree {
            return Ok((ignition, seed, tree, rejected));
        }
        rejected += 1;
    }
}

/// Build one instance with `n` tree nodes plus the agent at index `n`.
///
/// Precondition: `cfg.root_degree` must be feasible for `n`; the loop is not capped.
pub fn synthesize(cfg: &SynthCfg, n: usize, mut gen: InstanceGenerator) -> Result<InstanceRecord> {
    cfg.validate(n)?;
    let (ignition, tree_seed, tree, rejected) = sample_rooted_tree(cfg, n, &mut gen)?;
    tracing::debug!(n, ignition, tree_seed, rejected, "accepted tree");

    let mut layout = spring_layout(&tree, tree_seed, LayoutCfg::with_scale(cfg.scale));
    let AgentPlacement { position, offset } =
        metric::place_agent(&mut gen, layout[ignition], cfg.annulus())?;
    let distances = metric::distance_matrix(layout.coords(), position);
    let agent = layout.push(position);

    let summary = InstanceSummary {
        tree_seed,
        nodes: n,
        ignition,
        agent,
        delta: distances[(ignition, agent)],
        root_degree: tree.degree(ignition),
        max_degree: tree.max_degree(),
        tree_height: tree.height(ignition),
        scale: cfg.scale,
        agent_position: position,
        agent_offset: offset,
        rejected,
    };
    Ok(InstanceRecord {
        tree,
        layout,
        distances,
        summary,
    })
}

//! Scaled Euclidean distance matrices and annulus placement of the agent.
//!
//! - Distances are computed once for `i < j` and mirrored into the lower triangle, so
//!   `M[i][j] == M[j][i]` holds bit-for-bit.
//! - The agent occupies the last row/column of the matrix.

use crate::error::Result;
use crate::seeds::InstanceGenerator;
use nalgebra::{DMatrix, Vector2};

#[inline]
pub fn euclidean(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Upper-triangular distances among `nodes`, plus the agent column when given.
///
/// The lower triangle is left at zero; see [`reflect_upper`].
pub fn upper_distances(nodes: &[Vector2<f64>], agent: Option<Vector2<f64>>) -> DMatrix<f64> {
    let n = nodes.len();
    let dim = n + usize::from(agent.is_some());
    let mut m = DMatrix::<f64>::zeros(dim, dim);
    for i in 0..n {
        for j in i + 1..n {
            m[(i, j)] = euclidean(nodes[i], nodes[j]);
        }
    }
    if let Some(a) = agent {
        for (i, p) in nodes.iter().enumerate() {
            m[(i, n)] = euclidean(*p, a);
        }
    }
    m
}

/// Mirror the strict upper triangle onto the lower one and zero the diagonal.
pub fn reflect_upper(m: &mut DMatrix<f64>) {
    let dim = m.nrows();
    for i in 0..dim {
        m[(i, i)] = 0.0;
        for j in i + 1..dim {
            m[(j, i)] = m[(i, j)];
        }
    }
}

/// Full symmetric matrix over `nodes` followed by `agent`.
pub fn distance_matrix(nodes: &[Vector2<f64>], agent: Vector2<f64>) -> DMatrix<f64> {
    let mut m = upper_distances(nodes, Some(agent));
    reflect_upper(&mut m);
    m
}

/// Per-axis offset band `[low, high)` for the agent, already multiplied by the scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Annulus {
    pub low: f64,
    pub high: f64,
}

/// Where the agent landed relative to the ignition vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentPlacement {
    pub position: Vector2<f64>,
    pub offset: Vector2<f64>,
}

/// Draw per axis: magnitude in the band, then a fair sign flip (x first, then y).
pub fn place_agent(
    gen: &mut InstanceGenerator,
    center: Vector2<f64>,
    band: Annulus,
) -> Result<AgentPlacement> {
    let mut axis = || -> Result<f64> {
        let magnitude = gen.uniform(band.low, band.high)?;
        Ok(if gen.unit()? < 0.5 {
            -magnitude
        } else {
            magnitude
        })
    };
    let dx = axis()?;
    let dy = axis()?;
    let offset = Vector2::new(dx, dy);
    Ok(AgentPlacement {
        position: center + offset,
        offset,
    })
}

/// Largest `|M[i][j] - M[j][i]|` and largest `|M[i][i]|`.
pub fn asymmetry(m: &DMatrix<f64>) -> (f64, f64) {
    let mut off: f64 = 0.0;
    let mut diag: f64 = 0.0;
    for i in 0..m.nrows() {
        diag = diag.max(m[(i, i)].abs());
        for j in i + 1..m.ncols() {
            off = off.max((m[(i, j)] - m[(j, i)]).abs());
        }
    }
    (off, diag)
}

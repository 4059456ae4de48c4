//! Force-directed (Fruchterman–Reingold) embedding of a tree in the plane.
//!
//! Model
//! - Initial positions are uniform in `[0, 1)²`, drawn from an RNG seeded with the tree
//!   seed. Every ordered pair repels with `k²/d`; tree edges attract with `d²/k`, where
//!   `k = √(1/n)`. Steps are capped by a linearly cooling temperature.
//! - The final positions are centered at the origin and rescaled so the largest absolute
//!   coordinate equals `scale`.
//!
//! The embedding is a pure function of `(tree, seed, cfg)`.

use crate::tree::Tree;
use nalgebra::{DMatrix, Vector2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Index;

/// Spring-embedding parameters.
#[derive(Clone, Copy, Debug)]
pub struct LayoutCfg {
    pub scale: f64,
    pub iterations: usize,
    /// Stop once `‖steps‖ / n` drops below this value.
    pub threshold: f64,
}

impl Default for LayoutCfg {
    fn default() -> Self {
        Self {
            scale: 1.0,
            iterations: 50,
            threshold: 1e-4,
        }
    }
}

impl LayoutCfg {
    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }
}

const MIN_DIST: f64 = 0.01;

/// One 2-D coordinate per node, indexed by node id.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    coords: Vec<Vector2<f64>>,
}

impl Layout {
    pub fn from_coords(coords: Vec<Vector2<f64>>) -> Self {
        Self { coords }
    }

    pub fn coords(&self) -> &[Vector2<f64>] {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Vector2<f64>)> + '_ {
        self.coords.iter().copied().enumerate()
    }

    pub(crate) fn push(&mut self, p: Vector2<f64>) -> usize {
        self.coords.push(p);
        self.coords.len() - 1
    }
}

impl Index<usize> for Layout {
    type Output = Vector2<f64>;

    fn index(&self, i: usize) -> &Self::Output {
        &self.coords[i]
    }
}

pub fn spring_layout(tree: &Tree, seed: u64, cfg: LayoutCfg) -> Layout {
    let n = tree.node_count();
    if n <= 1 {
        return Layout::from_coords(vec![Vector2::zeros(); n]);
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pos: Vec<Vector2<f64>> = (0..n)
        .map(|_| Vector2::new(rng.gen::<f64>(), rng.gen::<f64>()))
        .collect();

    let mut adjacency = DMatrix::<f64>::zeros(n, n);
    for &(a, b) in tree.edges() {
        adjacency[(a, b)] = 1.0;
        adjacency[(b, a)] = 1.0;
    }

    let k = (1.0 / n as f64).sqrt();
    let (lo, hi) = bounding_box(&pos);
    let extent = hi - lo;
    let mut t = extent.x.max(extent.y) * 0.1;
    let dt = t / (cfg.iterations as f64 + 1.0);

    let mut disp: Vec<Vector2<f64>> = vec![Vector2::zeros(); n];
    for _ in 0..cfg.iterations {
        for (i, d) in disp.iter_mut().enumerate() {
            *d = Vector2::zeros();
            for j in 0..n {
                if i == j {
                    continue;
                }
                let delta = pos[i] - pos[j];
                let dist = delta.norm().max(MIN_DIST);
                *d += delta * (k * k / (dist * dist) - adjacency[(i, j)] * dist / k);
            }
        }
        let mut moved_sq: f64 = 0.0;
        for (p, d) in pos.iter_mut().zip(&disp) {
            let len = d.norm();
            let len = if len < MIN_DIST { 0.1 } else { len };
            let step = d * (t / len);
            moved_sq += step.norm_squared();
            *p += step;
        }
        t -= dt;
        if moved_sq.sqrt() / (n as f64) < cfg.threshold {
            break;
        }
    }
    rescale(&mut pos, cfg.scale);
    Layout::from_coords(pos)
}

fn bounding_box(pos: &[Vector2<f64>]) -> (Vector2<f64>, Vector2<f64>) {
    pos.iter().fold(
        (
            Vector2::repeat(f64::INFINITY),
            Vector2::repeat(f64::NEG_INFINITY),
        ),
        |(lo, hi), p| (lo.inf(p), hi.sup(p)),
    )
}

/// Center at the mean and scale so `max |coord| == scale`.
fn rescale(pos: &mut [Vector2<f64>], scale: f64) {
    let mean = pos.iter().fold(Vector2::<f64>::zeros(), |acc, p| acc + p) / pos.len() as f64;
    let mut lim: f64 = 0.0;
    for p in pos.iter_mut() {
        *p -= mean;
        lim = lim.max(p.x.abs()).max(p.y.abs());
    }
    if lim > 0.0 {
        for p in pos.iter_mut() {
            *p *= scale / lim;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_per_seed() {
        let t = Tree::random(9, 17);
        let a = spring_layout(&t, 17, LayoutCfg::default());
        let b = spring_layout(&t, 17, LayoutCfg::default());
        assert_eq!(a, b);
        let c = spring_layout(&t, 18, LayoutCfg::default());
        assert_ne!(a, c);
    }

    #[test]
    fn rescaled_to_scale_and_centered() {
        let t = Tree::random(15, 3);
        let l = spring_layout(&t, 3, LayoutCfg::with_scale(2.5));
        assert_eq!(l.len(), 15);
        let lim = l
            .coords()
            .iter()
            .map(|p| p.x.abs().max(p.y.abs()))
            .fold(0.0, f64::max);
        assert!((lim - 2.5).abs() < 1e-9);
        let mean = l.coords().iter().fold(Vector2::<f64>::zeros(), |acc, p| acc + p) / 15.0;
        assert!(mean.norm() < 1e-9);
    }

    #[test]
    fn neighbors_sit_closer_than_average() {
        let t = Tree::random(20, 8);
        let l = spring_layout(&t, 8, LayoutCfg::default());
        let edge_mean = t
            .edges()
            .iter()
            .map(|&(a, b)| (l[a] - l[b]).norm())
            .sum::<f64>()
            / t.edges().len() as f64;
        let mut all = 0.0;
        let mut pairs = 0usize;
        for i in 0..20 {
            for j in i + 1..20 {
                all += (l[i] - l[j]).norm();
                pairs += 1;
            }
        }
        assert!(edge_mean < all / pairs as f64);
    }

    #[test]
    fn single_node_at_origin() {
        let t = Tree::random(1, 0);
        let l = spring_layout(&t, 0, LayoutCfg::default());
        assert_eq!(l.coords(), &[Vector2::zeros()]);
    }
}

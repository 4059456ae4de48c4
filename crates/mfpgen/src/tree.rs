//! Labeled trees: uniform sampling via Prüfer sequences, degrees, BFS levels.
//!
//! A tree on `n` nodes is stored as its edge list (in decoding order) plus adjacency
//! lists. Uniform sampling draws a Prüfer sequence of length `n - 2` over `0..n` from a
//! dedicated RNG seeded with the tree seed, so a tree is a pure function of `(n, seed)`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    edges: Vec<(usize, usize)>,
    adj: Vec<Vec<usize>>,
}

impl Tree {
    /// Uniform random labeled tree on `n` nodes.
    pub fn random(n: usize, seed: u64) -> Self {
        if n < 2 {
            return Self::from_edges(n, Vec::new());
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let code: Vec<usize> = (0..n - 2).map(|_| rng.gen_range(0..n)).collect();
        Self::from_prufer(&code, n)
    }

    /// Decode a Prüfer sequence (entries in `0..n`, length `n - 2`).
    pub fn from_prufer(code: &[usize], n: usize) -> Self {
        debug_assert_eq!(code.len() + 2, n);
        let mut degree = vec![1usize; n];
        for &v in code {
            degree[v] += 1;
        }
        let mut ptr = degree.iter().position(|&d| d == 1).unwrap_or(0);
        let mut leaf = ptr;
        let mut edges = Vec::with_capacity(n.saturating_sub(1));
        for &v in code {
            edges.push((leaf, v));
            degree[v] -= 1;
            if degree[v] == 1 && v < ptr {
                leaf = v;
            } else {
                ptr += 1;
                while degree[ptr] != 1 {
                    ptr += 1;
                }
                leaf = ptr;
            }
        }
        edges.push((leaf, n - 1));
        Self::from_edges(n, edges)
    }

    fn from_edges(n: usize, edges: Vec<(usize, usize)>) -> Self {
        let mut adj = vec![Vec::new(); n];
        for &(a, b) in &edges {
            adj[a].push(b);
            adj[b].push(a);
        }
        Self { edges, adj }
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    /// Every edge exactly once.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adj[v]
    }

    pub fn degree(&self, v: usize) -> usize {
        self.adj[v].len()
    }

    pub fn max_degree(&self) -> usize {
        self.adj.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adj[a].contains(&b)
    }

    /// Shortest-path level of every node from `root` (`None` when unreachable).
    pub fn levels(&self, root: usize) -> Vec<Option<usize>> {
        let mut level = vec![None; self.node_count()];
        let mut queue = VecDeque::new();
        level[root] = Some(0);
        queue.push_back(root);
        while let Some(u) = queue.pop_front() {
            let next = level[u].map_or(0, |l| l + 1);
            for &w in &self.adj[u] {
                if level[w].is_none() {
                    level[w] = Some(next);
                    queue.push_back(w);
                }
            }
        }
        level
    }

    /// Maximum BFS level from `root`.
    pub fn height(&self, root: usize) -> usize {
        self.levels(root).into_iter().flatten().max().unwrap_or(0)
    }
}

//! Seed derivation for experiment batches.
//!
//! Purpose
//! - One recorded entropy value reproduces a whole batch: every (tree size, instance)
//!   pair gets its own child stream spawned from a single `SeedSequence`.
//!
//! Order
//! - Outer loop over grid sizes as given, inner loop over instance index. Child `k` of the
//!   root sequence belongs to `(grid[k / N], k % N)`.
//!
//! Code cross-refs: `SeedSequence`, `Entropy`, `BatchSeedRecord`, `synth::synthesize`.

mod entropy;
mod record;
mod sequence;

pub use entropy::Entropy;
pub use record::{parse_grid, BatchSeedRecord, SeedLog};
pub use sequence::SeedSequence;

use crate::error::{GenError, Result};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// One independent random stream bound to a single instance.
///
/// Consumed by value; every draw is counted against an optional budget.
#[derive(Debug)]
pub struct InstanceGenerator {
    rng: StdRng,
    draws: u64,
    budget: Option<u64>,
}

impl InstanceGenerator {
    pub fn from_sequence(seq: &SeedSequence) -> Self {
        Self::from_rng(StdRng::from_seed(seq.seed_bytes()))
    }

    /// Stand-alone generator, handy for single instances outside a batch.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            draws: 0,
            budget: None,
        }
    }

    /// Cap the number of draws; exceeding it fails with `GeneratorExhausted`.
    pub fn with_draw_budget(mut self, budget: u64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    fn draw<T>(&mut self, f: impl FnOnce(&mut StdRng) -> T) -> Result<T> {
        let next = self.draws.checked_add(1).ok_or(GenError::GeneratorExhausted)?;
        if matches!(self.budget, Some(b) if next > b) {
            return Err(GenError::GeneratorExhausted);
        }
        self.draws = next;
        Ok(f(&mut self.rng))
    }

    pub fn next_u64(&mut self) -> Result<u64> {
        self.draw(|rng| rng.next_u64())
    }

    /// Uniform integer in `[lo, hi)`.
    pub(crate) fn below(&mut self, lo: usize, hi: usize) -> Result<usize> {
        self.draw(|rng| rng.gen_range(lo..hi))
    }

    /// Uniform tree seed in `[0, 2^32 - 1)`.
    pub(crate) fn tree_seed(&mut self) -> Result<u64> {
        self.draw(|rng| rng.gen_range(0..u64::from(u32::MAX)))
    }

    /// Uniform real in `[lo, hi)`.
    pub(crate) fn uniform(&mut self, lo: f64, hi: f64) -> Result<f64> {
        self.draw(|rng| rng.gen_range(lo..hi))
    }

    /// Uniform real in `[0, 1)`.
    pub(crate) fn unit(&mut self) -> Result<f64> {
        self.draw(|rng| rng.gen::<f64>())
    }
}

/// Shape of a batch plus the entropy that reproduces it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExperimentBatch {
    entropy: Entropy,
    grid: Vec<usize>,
    instances: usize,
}

impl ExperimentBatch {
    pub fn new(entropy: Entropy, grid: Vec<usize>, instances: usize) -> Result<Self> {
        if grid.is_empty() {
            return Err(GenError::invalid("grid of tree sizes must not be empty"));
        }
        if grid.contains(&0) {
            return Err(GenError::invalid("tree sizes must be positive"));
        }
        if instances == 0 {
            return Err(GenError::invalid("instances per size must be > 0"));
        }
        if grid.len().checked_mul(instances).map_or(true, |t| t > u32::MAX as usize) {
            return Err(GenError::invalid("batch exceeds the spawnable child count"));
        }
        Ok(Self {
            entropy,
            grid,
            instances,
        })
    }

    pub fn from_record(record: &BatchSeedRecord) -> Result<Self> {
        Self::new(record.entropy.clone(), record.grid.clone(), record.instances)
    }

    pub fn entropy(&self) -> &Entropy {
        &self.entropy
    }

    pub fn grid(&self) -> &[usize] {
        &self.grid
    }

    pub fn instances(&self) -> usize {
        self.instances
    }

    pub fn total(&self) -> usize {
        self.grid.len() * self.instances
    }

    /// All generators in batch order.
    pub fn generators(&self) -> Vec<InstanceGenerator> {
        let mut root = SeedSequence::new(self.entropy.clone());
        root.spawn(self.total() as u32)
            .iter()
            .map(InstanceGenerator::from_sequence)
            .collect()
    }

    /// Group a flat generator list into one sub-batch per grid size.
    pub fn partition(
        &self,
        generators: Vec<InstanceGenerator>,
    ) -> Vec<(usize, Vec<InstanceGenerator>)> {
        let mut iter = generators.into_iter();
        self.grid
            .iter()
            .map(|&size| (size, iter.by_ref().take(self.instances).collect()))
            .collect()
    }

    pub fn record(&self, index: usize) -> BatchSeedRecord {
        BatchSeedRecord {
            index,
            entropy: self.entropy.clone(),
            grid: self.grid.clone(),
            instances: self.instances,
        }
    }
}

/// Spawn `|grid| * instances` generators from `entropy` and hand the entropy back.
pub fn derive_batch(
    entropy: Entropy,
    grid: &[usize],
    instances: usize,
) -> Result<(Vec<InstanceGenerator>, Entropy)> {
    let batch = ExperimentBatch::new(entropy, grid.to_vec(), instances)?;
    let generators = batch.generators();
    tracing::debug!(
        entropy = %batch.entropy,
        sizes = batch.grid.len(),
        instances,
        total = generators.len(),
        "derived batch"
    );
    Ok((generators, batch.entropy))
}

/// Rebuild the generators of a recorded batch; the requested shape must match the record.
pub fn load_batch(
    record: &BatchSeedRecord,
    grid: &[usize],
    instances: usize,
) -> Result<Vec<InstanceGenerator>> {
    if record.grid != grid {
        return Err(GenError::mismatch(format!(
            "recorded grid {:?} differs from requested {:?}",
            record.grid, grid
        )));
    }
    if record.instances != instances {
        return Err(GenError::mismatch(format!(
            "recorded {} instances per size, requested {}",
            record.instances, instances
        )));
    }
    let (generators, _) = derive_batch(record.entropy.clone(), grid, instances)?;
    Ok(generators)
}

#[cfg(test)]
mod tests;

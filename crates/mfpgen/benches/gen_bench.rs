//! Criterion microbenches for batch derivation and instance synthesis.
//!
//! - seeds: spawning a batch of generators from one entropy value.
//! - synth: full instances at a few tree sizes (ignition degree 3).
//! - layout: spring embedding alone.
//!
//! Results live under `target/criterion`.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use mfpgen::layout::{spring_layout, LayoutCfg};
use mfpgen::prelude::*;

fn bench_seeds(c: &mut Criterion) {
    let mut group = c.benchmark_group("seeds");
    let grid = [10, 20, 30, 40];
    group.bench_function(BenchmarkId::new("derive_batch", "4x25"), |b| {
        b.iter(|| derive_batch(Entropy::from(2025u64), &grid, 25).unwrap())
    });
    group.finish();
}

fn bench_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("synth");
    let cfg = SynthCfg::default();
    for n in [10usize, 30, 60] {
        group.bench_function(BenchmarkId::new("synthesize", n), |b| {
            b.iter_batched(
                || InstanceGenerator::seed_from_u64(n as u64),
                |gen| synthesize(&cfg, n, gen).unwrap(),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for n in [20usize, 60] {
        let tree = Tree::random(n, 4);
        group.bench_function(BenchmarkId::new("spring_layout", n), |b| {
            b.iter(|| spring_layout(&tree, 4, LayoutCfg::default()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_seeds, bench_synth, bench_layout);
criterion_main!(benches);

//! Property tests over random batches and configurations.
//!
//! 1. Every accepted instance has the requested ignition degree.
//! 2. Distance matrices are exactly symmetric with a zero diagonal.
//! 3. Agent offsets respect the per-axis band.
//! 4. Replaying a record reproduces the instances bit-for-bit.

use mfpgen::prelude::*;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Node count and a root degree that is feasible (and cheap to hit) for it.
fn size_and_degree() -> impl Strategy<Value = (usize, usize)> {
    (3usize..14).prop_flat_map(|n| (Just(n), 1usize..=3.min(n - 1)))
}

fn synth_cfg(root_degree: usize) -> impl Strategy<Value = SynthCfg> {
    (0.1f64..10.0, 0.0f64..0.5, 0.01f64..0.5).prop_map(move |(scale, low, width)| SynthCfg {
        scale,
        root_degree,
        delta_low: low,
        delta_high: low + width,
    })
}

fn instance() -> impl Strategy<Value = (SynthCfg, usize, u64)> {
    size_and_degree()
        .prop_flat_map(|(n, d)| (synth_cfg(d), Just(n), any::<u64>()))
}

// ============================================================================
// Instance invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ignition_degree_matches((cfg, n, seed) in instance()) {
        let rec = synthesize(&cfg, n, InstanceGenerator::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(rec.tree().degree(rec.ignition()), cfg.root_degree);
        prop_assert!(rec.ignition() < n - 1);
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal((cfg, n, seed) in instance()) {
        let rec = synthesize(&cfg, n, InstanceGenerator::seed_from_u64(seed)).unwrap();
        let m = rec.distances();
        prop_assert_eq!(m.shape(), (n + 1, n + 1));
        for i in 0..=n {
            prop_assert_eq!(m[(i, i)], 0.0);
            for j in 0..=n {
                prop_assert_eq!(m[(i, j)], m[(j, i)]);
            }
        }
    }

    #[test]
    fn agent_offsets_in_band((cfg, n, seed) in instance()) {
        let rec = synthesize(&cfg, n, InstanceGenerator::seed_from_u64(seed)).unwrap();
        let off = rec.summary().agent_offset;
        let lo = cfg.delta_low * cfg.scale;
        let hi = cfg.delta_high * cfg.scale;
        for v in [off.x, off.y] {
            prop_assert!(v.abs() >= lo && v.abs() <= hi, "{} not in [{}, {}]", v, lo, hi);
        }
    }

    #[test]
    fn layout_fits_scale((cfg, n, seed) in instance()) {
        let rec = synthesize(&cfg, n, InstanceGenerator::seed_from_u64(seed)).unwrap();
        let tree_lim = rec.layout().coords()[..n]
            .iter()
            .map(|p| p.x.abs().max(p.y.abs()))
            .fold(0.0, f64::max);
        prop_assert!((tree_lim - cfg.scale).abs() <= 1e-9 * cfg.scale);
    }
}

// ============================================================================
// Batch reproduction
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn replayed_batch_matches(entropy in any::<u128>(), grid in prop::collection::vec(4usize..9, 1..3), per in 1usize..3) {
        let cfg = SynthCfg { root_degree: 2, ..SynthCfg::default() };
        let (gens, entropy) = derive_batch(Entropy::from(entropy), &grid, per).unwrap();
        let record: BatchSeedRecord = ExperimentBatch::new(entropy, grid.clone(), per)
            .unwrap()
            .record(0)
            .to_string()
            .parse()
            .unwrap();
        let replay = load_batch(&record, &grid, per).unwrap();
        let sizes: Vec<usize> = grid.iter().flat_map(|&g| std::iter::repeat(g).take(per)).collect();
        prop_assert_eq!(gens.len(), sizes.len());
        for ((a, b), n) in gens.into_iter().zip(replay).zip(sizes) {
            let ra = synthesize(&cfg, n, a).unwrap();
            let rb = synthesize(&cfg, n, b).unwrap();
            prop_assert_eq!(ra.summary(), rb.summary());
            prop_assert_eq!(ra.distances(), rb.distances());
        }
    }
}

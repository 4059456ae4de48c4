use super::*;

fn first_draws(gens: &mut [InstanceGenerator]) -> Vec<u64> {
    gens.iter_mut().map(|g| g.next_u64().unwrap()).collect()
}

#[test]
fn derive_batch_counts_and_distinct_first_draws() {
    let grid = [10, 20, 30];
    let (mut gens, entropy) = derive_batch(Entropy::from(2024u64), &grid, 4).unwrap();
    assert_eq!(entropy, Entropy::from(2024u64));
    assert_eq!(gens.len(), 12);
    let mut draws = first_draws(&mut gens);
    draws.sort_unstable();
    draws.dedup();
    assert_eq!(draws.len(), 12);
}

#[test]
fn load_batch_replays_identical_streams() {
    let entropy = Entropy::fresh();
    let (mut original, entropy) = derive_batch(entropy, &[5, 8], 3).unwrap();
    let record = BatchSeedRecord {
        index: 0,
        entropy,
        grid: vec![5, 8],
        instances: 3,
    };
    let mut a = load_batch(&record, &[5, 8], 3).unwrap();
    let mut b = load_batch(&record, &[5, 8], 3).unwrap();
    for _ in 0..4 {
        let da = first_draws(&mut a);
        assert_eq!(da, first_draws(&mut b));
        assert_eq!(da, first_draws(&mut original));
    }
}

#[test]
fn load_batch_rejects_shape_disagreement() {
    let record = BatchSeedRecord {
        index: 1,
        entropy: Entropy::from(9u64),
        grid: vec![10, 20],
        instances: 2,
    };
    assert!(matches!(
        load_batch(&record, &[10, 30], 2),
        Err(GenError::ReproductionMismatch { .. })
    ));
    assert!(matches!(
        load_batch(&record, &[10, 20], 3),
        Err(GenError::ReproductionMismatch { .. })
    ));
}

#[test]
fn invalid_batch_shapes() {
    let e = || Entropy::from(1u64);
    for (grid, n) in [(Vec::<usize>::new(), 3usize), (vec![10], 0), (vec![10, 0], 2)] {
        assert!(matches!(
            derive_batch(e(), &grid, n),
            Err(GenError::InvalidConfiguration { .. })
        ));
    }
}

#[test]
fn partition_follows_size_major_order() {
    let batch = ExperimentBatch::new(Entropy::from(77u64), vec![6, 9, 12], 2).unwrap();
    let mut flat = batch.generators();
    let expected = first_draws(&mut flat);
    let parts = batch.partition(batch.generators());
    assert_eq!(
        parts.iter().map(|(s, g)| (*s, g.len())).collect::<Vec<_>>(),
        vec![(6, 2), (9, 2), (12, 2)]
    );
    let got: Vec<u64> = parts
        .into_iter()
        .flat_map(|(_, mut g)| first_draws(&mut g))
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn draw_budget_exhausts() {
    let mut g = InstanceGenerator::seed_from_u64(1).with_draw_budget(2);
    assert!(g.next_u64().is_ok());
    assert!(g.unit().is_ok());
    assert_eq!(g.next_u64(), Err(GenError::GeneratorExhausted));
    assert_eq!(g.draws(), 2);
}

#[test]
fn record_rebuilds_batch() {
    let batch = ExperimentBatch::new(Entropy::from(5u64), vec![4, 7], 2).unwrap();
    let rec: BatchSeedRecord = batch.record(4).to_string().parse().unwrap();
    assert_eq!(ExperimentBatch::from_record(&rec).unwrap(), batch);
}

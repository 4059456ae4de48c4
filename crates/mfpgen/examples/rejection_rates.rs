//! Show how many trees the rejection loop discards per accepted instance.
//!
//! Usage:
//!   cargo run -p mfpgen --example rejection_rates -- 3
//!
//! Prints, for a few tree sizes, the mean rejected draws and the mean tree height
//! at the requested ignition degree (default 3).

use mfpgen::prelude::*;

fn main() {
    let degree = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3usize);
    let cfg = SynthCfg {
        root_degree: degree,
        ..SynthCfg::default()
    };
    let grid = [10, 20, 40, 80];
    let per = 20;
    let batch = ExperimentBatch::new(Entropy::from(2025u64), grid.to_vec(), per).unwrap();
    for (n, gens) in batch.partition(batch.generators()) {
        let mut rejected = 0u64;
        let mut height = 0usize;
        for gen in gens {
            let rec = synthesize(&cfg, n, gen).unwrap();
            rejected += rec.summary().rejected;
            height += rec.summary().tree_height;
        }
        println!(
            "n={n:3}: mean rejected {:.1}, mean height {:.2}",
            rejected as f64 / per as f64,
            height as f64 / per as f64
        );
    }
}

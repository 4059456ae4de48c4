//! Experiment directory bookkeeping.
//!
//! Layout under the root (default `Experiments/`):
//! - `Seeds`: one `BatchSeedRecord` line per batch, append-only;
//! - `Experiment_<k>/batch.json`: run report for record `k`;
//! - `Experiment_<k>/Size_<n>/Instance_<i>/`: artifacts of one instance.

use crate::provenance::{self, Payload};
use crate::writers;
use anyhow::{Context, Result};
use mfpgen::prelude::*;
use serde::Serialize;
use serde_json::json;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub struct ExperimentDir {
    root: PathBuf,
}

impl ExperimentDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn seeds_path(&self) -> PathBuf {
        self.root.join("Seeds")
    }

    pub fn experiment_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("Experiment_{index}"))
    }

    pub fn instance_path(&self, index: usize, size: usize, instance: usize) -> PathBuf {
        self.experiment_path(index)
            .join(format!("Size_{size}"))
            .join(format!("Instance_{instance}"))
    }

    /// Parsed seed log; a missing file is an empty log.
    pub fn load_log(&self) -> Result<SeedLog> {
        let path = self.seeds_path();
        if !path.exists() {
            return Ok(SeedLog::default());
        }
        let text =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        SeedLog::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn append_record(&self, record: &BatchSeedRecord) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating {}", self.root.display()))?;
        let path = self.seeds_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        writeln!(file, "{record}").with_context(|| format!("appending to {}", path.display()))?;
        Ok(())
    }
}

/// Outcome of writing one batch.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub index: usize,
    pub entropy: String,
    pub grid: Vec<usize>,
    pub instances: usize,
    pub written: usize,
    pub mean_rejected: f64,
}

/// Record a fresh batch in the seed log and write all of its instances.
pub fn generate(
    dir: &ExperimentDir,
    grid: Vec<usize>,
    instances: usize,
    cfg: &SynthCfg,
) -> Result<BatchReport> {
    let batch = ExperimentBatch::new(Entropy::fresh(), grid, instances)?;
    for &n in batch.grid() {
        cfg.validate(n)
            .with_context(|| format!("tree size {n} cannot satisfy the configuration"))?;
    }
    let index = dir.load_log()?.next_index();
    dir.append_record(&batch.record(index))?;
    tracing::info!(index, entropy = %batch.entropy(), "recorded new batch");
    write_batch(dir, &batch.record(index), cfg)
}

/// Regenerate the batch stored at `index` of the seed log.
pub fn reproduce(dir: &ExperimentDir, index: usize, cfg: &SynthCfg) -> Result<BatchReport> {
    let log = dir.load_log()?;
    let record = log.get(index)?.clone();
    tracing::info!(index, entropy = %record.entropy, grid = %record.grid_string(), "reproducing batch");
    write_batch(dir, &record, cfg)
}

fn write_batch(dir: &ExperimentDir, record: &BatchSeedRecord, cfg: &SynthCfg) -> Result<BatchReport> {
    let batch = ExperimentBatch::from_record(record)?;
    let generators = load_batch(record, batch.grid(), batch.instances())?;
    let line = record.to_string();
    let mut written = 0usize;
    let mut rejected = 0u64;
    for (size, gens) in batch.partition(generators) {
        for (i, gen) in gens.into_iter().enumerate() {
            let rec = synthesize(cfg, size, gen)
                .with_context(|| format!("synthesizing size {size} instance {i}"))?;
            let path = dir.instance_path(record.index, size, i);
            writers::write_instance(&path, &rec)?;
            let params = json!({
                "size": size,
                "instance": i,
                "scale": cfg.scale,
                "root_degree": cfg.root_degree,
                "delta": [cfg.delta_low, cfg.delta_high],
            });
            provenance::write_sidecar(
                path.join(writers::INFO_FILE),
                Payload::new(params).with_seed_record(line.clone()),
            )?;
            rejected += rec.summary().rejected;
            written += 1;
        }
        tracing::info!(size, instances = batch.instances(), "wrote size batch");
    }
    let report = BatchReport {
        index: record.index,
        entropy: record.entropy.to_string(),
        grid: record.grid.clone(),
        instances: record.instances,
        written,
        mean_rejected: rejected as f64 / written.max(1) as f64,
    };
    let report_path = dir.experiment_path(record.index).join("batch.json");
    fs::write(&report_path, serde_json::to_vec_pretty(&report)?)
        .with_context(|| format!("writing {}", report_path.display()))?;
    Ok(report)
}

/// Per-batch comparison of persisted matrices against a fresh regeneration.
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub index: usize,
    pub checked: usize,
    pub max_abs_diff: f64,
}

const VERIFY_TOL: f64 = 1e-9;

/// Regenerate record `index` in memory and compare with the stored distance matrices.
pub fn verify(dir: &ExperimentDir, index: usize, cfg: &SynthCfg) -> Result<VerifyReport> {
    let log = dir.load_log()?;
    let record = log.get(index)?.clone();
    let batch = ExperimentBatch::from_record(&record)?;
    let generators = load_batch(&record, batch.grid(), batch.instances())?;
    let mut checked = 0usize;
    let mut max_abs_diff: f64 = 0.0;
    for (size, gens) in batch.partition(generators) {
        for (i, gen) in gens.into_iter().enumerate() {
            let rec = synthesize(cfg, size, gen)?;
            let path = dir.instance_path(index, size, i).join(writers::MATRIX_FILE);
            let stored = writers::read_matrix_csv(&path)?;
            if stored.shape() != rec.distances().shape() {
                return Err(GenError::mismatch(format!(
                    "{}: stored shape {:?}, regenerated {:?}",
                    path.display(),
                    stored.shape(),
                    rec.distances().shape()
                ))
                .into());
            }
            let diff = (stored - rec.distances()).abs().max();
            if diff > VERIFY_TOL {
                return Err(GenError::mismatch(format!(
                    "{}: distances differ by {diff:e}",
                    path.display()
                ))
                .into());
            }
            max_abs_diff = max_abs_diff.max(diff);
            checked += 1;
        }
    }
    tracing::info!(index, checked, max_abs_diff, "verified batch");
    Ok(VerifyReport {
        index,
        checked,
        max_abs_diff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn cfg() -> SynthCfg {
        SynthCfg {
            root_degree: 2,
            ..SynthCfg::default()
        }
    }

    #[test]
    fn generate_appends_records_and_writes_instances() {
        let tmp = tempdir().unwrap();
        let dir = ExperimentDir::new(tmp.path());
        let first = generate(&dir, vec![5, 7], 2, &cfg()).unwrap();
        let second = generate(&dir, vec![6], 1, &cfg()).unwrap();
        assert_eq!((first.index, second.index), (0, 1));
        assert_eq!(first.written, 4);
        let log = dir.load_log().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(0).unwrap().grid, vec![5, 7]);
        let inst = dir.instance_path(0, 7, 1);
        assert!(inst.join(writers::SOLVER_FILE).exists());
        assert!(inst.join("instance_info.provenance.json").exists());
        assert!(dir.experiment_path(1).join("batch.json").exists());
    }

    #[test]
    fn reproduce_rewrites_identical_files() {
        let tmp = tempdir().unwrap();
        let dir = ExperimentDir::new(tmp.path());
        generate(&dir, vec![6], 2, &cfg()).unwrap();
        let inst = dir.instance_path(0, 6, 1);
        let before = fs::read_to_string(inst.join(writers::SUMMARY_FILE)).unwrap();
        let matrix_before = fs::read(inst.join(writers::MATRIX_FILE)).unwrap();
        fs::remove_dir_all(dir.experiment_path(0)).unwrap();
        reproduce(&dir, 0, &cfg()).unwrap();
        assert_eq!(fs::read_to_string(inst.join(writers::SUMMARY_FILE)).unwrap(), before);
        assert_eq!(fs::read(inst.join(writers::MATRIX_FILE)).unwrap(), matrix_before);
        assert_eq!(dir.load_log().unwrap().len(), 1);
    }

    #[test]
    fn verify_detects_tampering() {
        let tmp = tempdir().unwrap();
        let dir = ExperimentDir::new(tmp.path());
        generate(&dir, vec![5], 2, &cfg()).unwrap();
        let report = verify(&dir, 0, &cfg()).unwrap();
        assert_eq!(report.checked, 2);
        assert!(report.max_abs_diff <= VERIFY_TOL);

        let path = dir.instance_path(0, 5, 0).join(writers::MATRIX_FILE);
        let mut m = writers::read_matrix_csv(&path).unwrap();
        m[(0, 1)] += 1.0;
        writers::write_matrix_csv(&path, &m).unwrap();
        let err = verify(&dir, 0, &cfg()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GenError>(),
            Some(GenError::ReproductionMismatch { .. })
        ));
    }

    #[test]
    fn infeasible_configuration_records_nothing() {
        let tmp = tempdir().unwrap();
        let dir = ExperimentDir::new(tmp.path());
        let bad = SynthCfg {
            root_degree: 5,
            ..SynthCfg::default()
        };
        assert!(generate(&dir, vec![10, 4], 1, &bad).is_err());
        assert!(dir.load_log().unwrap().is_empty());
    }

    #[test]
    fn unknown_index_is_an_error() {
        let tmp = tempdir().unwrap();
        let dir = ExperimentDir::new(tmp.path());
        assert!(reproduce(&dir, 0, &cfg()).is_err());
    }
}

//! `<stem>.provenance.json` sidecars next to generated artifacts.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Overrides the revision lookup, e.g. in builds without a checkout.
const REV_ENV: &str = "MFPGEN_CODE_REV";

/// Caller-supplied part of a sidecar.
pub struct Payload {
    pub params: Value,
    /// Seed log line of the batch the artifact belongs to.
    pub seed_record: Option<String>,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self {
            params,
            seed_record: None,
        }
    }

    pub fn with_seed_record(mut self, line: impl Into<String>) -> Self {
        self.seed_record = Some(line.into());
        self
    }
}

#[derive(Serialize)]
struct Sidecar<'a> {
    code_rev: String,
    generator_version: &'static str,
    written_by: String,
    seed_record: Option<&'a str>,
    params: &'a Value,
    artifact: String,
}

/// Describe `artifact` in a sibling sidecar; returns the sidecar path.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let path = sidecar_path(artifact);
    let caller = Location::caller();
    let doc = Sidecar {
        code_rev: code_rev(),
        generator_version: mfpgen::VERSION,
        written_by: format!("{}:{}", caller.file(), caller.line()),
        seed_record: payload.seed_record.as_deref(),
        params: &payload.params,
        artifact: artifact.display().to_string(),
    };
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map_or_else(|| "artifact".into(), |s| s.to_string_lossy().into_owned());
    artifact.with_file_name(format!("{stem}.provenance.json"))
}

/// Revision from `MFPGEN_CODE_REV`, then `git`, else `"unknown"`.
pub fn code_rev() -> String {
    if let Some(rev) = std::env::var(REV_ENV).ok().filter(|r| !r.is_empty()) {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_artifact() {
        let base = Path::new("/tmp/Experiment_0/instance_info.json");
        assert_eq!(
            sidecar_path(base),
            Path::new("/tmp/Experiment_0/instance_info.provenance.json")
        );
    }

    #[test]
    fn sidecar_carries_seed_record() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("instance_info.json");
        fs::write(&artifact, "{}").unwrap();
        let payload = Payload::new(json!({"size": 10, "instance": 2}))
            .with_seed_record("0 12345 10,20 3");
        let path = write_sidecar(&artifact, payload).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["artifact"], artifact.display().to_string());
        assert_eq!(parsed["seed_record"], "0 12345 10,20 3");
        assert_eq!(parsed["params"]["size"], 10);
        assert_eq!(parsed["generator_version"], mfpgen::VERSION);
        assert!(parsed["written_by"].as_str().unwrap().contains("provenance.rs"));
    }
}

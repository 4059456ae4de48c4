//! One-line batch seed records (`<index> <entropy> <grid> <instances>`).

use super::entropy::Entropy;
use crate::error::{GenError, Result};
use std::fmt;
use std::str::FromStr;

/// Everything needed to replay a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchSeedRecord {
    /// Position of the record in the seed log (also the experiment number).
    pub index: usize,
    pub entropy: Entropy,
    pub grid: Vec<usize>,
    pub instances: usize,
}

impl BatchSeedRecord {
    pub fn grid_string(&self) -> String {
        self.grid
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Parse a comma-separated grid such as `10,20,30`.
pub fn parse_grid(s: &str) -> Result<Vec<usize>> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| GenError::invalid(format!("bad grid entry {part:?} in {s:?}")))
        })
        .collect()
}

impl fmt::Display for BatchSeedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.index,
            self.entropy,
            self.grid_string(),
            self.instances
        )
    }
}

impl FromStr for BatchSeedRecord {
    type Err = GenError;

    fn from_str(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [index, entropy, grid, instances] = fields.as_slice() else {
            return Err(GenError::invalid(format!(
                "seed record needs 4 fields, got {}: {line:?}",
                fields.len()
            )));
        };
        let index = index
            .parse()
            .map_err(|_| GenError::invalid(format!("bad record index {index:?}")))?;
        let instances = instances
            .parse()
            .map_err(|_| GenError::invalid(format!("bad instance count {instances:?}")))?;
        Ok(Self {
            index,
            entropy: entropy.parse()?,
            grid: parse_grid(grid)?,
            instances,
        })
    }
}

/// All records of a seed file, in append order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedLog {
    records: Vec<BatchSeedRecord>,
}

impl SeedLog {
    pub fn parse(text: &str) -> Result<Self> {
        let records = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[BatchSeedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index the next appended record will carry.
    pub fn next_index(&self) -> usize {
        self.records.len()
    }

    /// Select by line position, as the record index refers to it.
    pub fn get(&self, index: usize) -> Result<&BatchSeedRecord> {
        self.records.get(index).ok_or_else(|| {
            GenError::invalid(format!(
                "seed index {index} out of range (log has {} records)",
                self.records.len()
            ))
        })
    }
}

//! Per-instance artifacts: solver text files, JSON summaries, adjacency list, matrix CSV.

use anyhow::{bail, Context, Result};
use mfpgen::prelude::*;
use polars::prelude::*;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

pub const SOLVER_FILE: &str = "BCKTRCK.mfp";
pub const SUMMARY_FILE: &str = "SUMMARY.mfp";
pub const INFO_FILE: &str = "instance_info.json";
pub const LAYOUT_FILE: &str = "layout_MFF.json";
pub const ADJLIST_FILE: &str = "MFF_Tree.adjlist";
pub const MATRIX_FILE: &str = "FDM_MFFP.csv";

/// Write every artifact of `rec` into `dir` (created if missing).
pub fn write_instance(dir: &Path, rec: &InstanceRecord) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    write_text(&dir.join(SOLVER_FILE), &solver_input_text(&rec.solver_input()))?;
    write_text(&dir.join(SUMMARY_FILE), &summary_text(&rec.summary_record()))?;
    write_text(&dir.join(ADJLIST_FILE), &adjlist(rec.tree(), rec.agent()))?;
    write_json(&dir.join(INFO_FILE), &instance_info(rec.summary()))?;
    write_json(&dir.join(LAYOUT_FILE), &layout_json(rec.layout()))?;
    write_matrix_csv(&dir.join(MATRIX_FILE), rec.distances())
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn write_json(path: &Path, doc: &Value) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(doc)?)
        .with_context(|| format!("writing {}", path.display()))
}

pub fn solver_input_text(input: &SolverInput) -> String {
    let mut out = format!(
        "DIMENSION: {}\nFIRE_START: {}\nFIREFIGHTER: {}\nDISPLAY_DATA_SECTION\n",
        input.dimension, input.ignition, input.agent
    );
    for (i, p) in &input.coords {
        out.push_str(&format!("{i} {} {}\n", p.x, p.y));
    }
    out.push_str("EDGE_SECTION\n");
    for (a, b) in &input.edges {
        out.push_str(&format!("{a} {b}\n"));
    }
    out
}

pub fn summary_text(s: &SummaryRecord) -> String {
    format!(
        "TREE SEED: {}\nDIMENSION: {}\nFIRE_START: {}\nFIREFIGHTER: {}\nDELTA: {}\n\
         ROOT DEGREE: {}\nMAX DEGREE: {}\nTREE HEIGHT: {}\nSCALE_DISTANCE: {}\n",
        s.tree_seed,
        s.dimension,
        s.ignition,
        s.agent,
        s.delta,
        s.root_degree,
        s.max_degree,
        s.tree_height,
        s.scale
    )
}

/// Adjacency list with each edge listed once, from its lower-numbered endpoint's line
/// in visit order; the agent appears as an isolated node.
pub fn adjlist(tree: &Tree, agent: usize) -> String {
    let mut seen = vec![false; tree.node_count()];
    let mut out = String::new();
    for u in 0..tree.node_count() {
        let mut line = u.to_string();
        for &w in tree.neighbors(u) {
            if !seen[w] {
                line.push_str(&format!(" {w}"));
            }
        }
        seen[u] = true;
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&format!("{agent}\n"));
    out
}

pub fn instance_info(s: &InstanceSummary) -> Value {
    json!({
        "N": s.nodes,
        "seed": s.tree_seed,
        "scale": s.scale,
        "start_fire": s.ignition,
        "a_pos_x": s.agent_position.x,
        "a_pos_y": s.agent_position.y,
        "tree_height": s.tree_height,
        "root_degree": s.root_degree,
        "max_degree": s.max_degree,
        "delta": s.delta,
        "rejected_trees": s.rejected,
    })
}

/// `{"0": [x, y], ...}` including the agent.
pub fn layout_json(layout: &Layout) -> Value {
    let mut map = Map::new();
    for (i, p) in layout.iter() {
        map.insert(i.to_string(), json!([p.x, p.y]));
    }
    Value::Object(map)
}

/// One CSV column per matrix column, headed by the node index.
pub fn write_matrix_csv(path: &Path, m: &DMatrix<f64>) -> Result<()> {
    let columns: Vec<Series> = (0..m.ncols())
        .map(|j| Series::new(j.to_string().into(), m.column(j).iter().copied().collect::<Vec<f64>>()))
        .collect();
    let mut df = DataFrame::new(columns)?;
    let mut file =
        fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), dim = m.nrows(), "wrote distance matrix");
    Ok(())
}

pub fn read_matrix_csv(path: &Path) -> Result<DMatrix<f64>> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .finish()?
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    let (rows, cols) = df.shape();
    if rows != cols {
        bail!("{} holds a {rows}x{cols} matrix", path.display());
    }
    let mut m = DMatrix::<f64>::zeros(rows, cols);
    for (j, series) in df.get_columns().iter().enumerate() {
        let values = series.cast(&DataType::Float64)?;
        for (i, v) in values.f64()?.into_iter().enumerate() {
            m[(i, j)] = v.with_context(|| format!("null entry ({i}, {j}) in {}", path.display()))?;
        }
    }
    Ok(m)
}

/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! `cube-cli run`: loads the prepared rollup family plus the read-only
//! fallback store, executes every query pattern, and writes one CSV per
//! query (C6, C7, C8, C9). Per spec.md §7 each query's failure is isolated —
//! one bad pattern does not stop the rest of the workload — but the process
//! exit code still reflects whether every query succeeded (§6).

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{error, info};

use crate::config::RunConfig;
use cube_core::result::QueryResult as ResultSet;
use cube_query::{parse_query_value, run_query};
use cube_store::{open_read_only, read_fallback_timezone, CubeStore};

/// Soft per-workload budget (§5 "Cancellation & timeouts"). Exceeding it
/// only logs a warning.
const RUN_BUDGET_MS: u128 = 1_000;

#[derive(Args, Debug)]
pub struct RunArgs {
  /// Directory containing the prepared cube family's `.arrow`/`.meta.json` files.
  #[arg(long)]
  rollup_dir: PathBuf,

  /// Path to the DuckDB fallback database built by `prepare`.
  #[arg(long)]
  fallback_path: PathBuf,

  /// JSON file containing a list of query pattern objects.
  #[arg(long, conflicts_with = "query_dir")]
  query_file: Option<PathBuf>,

  /// Directory of `.json` files, each one query pattern object.
  #[arg(long, conflicts_with = "query_file")]
  query_dir: Option<PathBuf>,

  /// Directory to write one `q<i>.csv` result file per query.
  #[arg(long)]
  output_dir: PathBuf,
}

impl RunArgs {
  fn into_config(self) -> RunConfig {
    RunConfig {
      rollup_dir: self.rollup_dir,
      fallback_path: self.fallback_path,
      query_file: self.query_file,
      query_dir: self.query_dir,
      output_dir: self.output_dir,
    }
  }
}

/// Loads every query pattern, preserving the order they're meant to be
/// numbered in (`q1.csv`, `q2.csv`, ...).
fn load_queries(config: &RunConfig) -> Result<Vec<serde_json::Value>> {
  if let Some(path) = &config.query_file {
    info!(path = %path.display(), "loading queries from JSON file");
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    return Ok(match value {
      serde_json::Value::Array(items) => items,
      other => vec![other],
    });
  }

  if let Some(dir) = &config.query_dir {
    info!(dir = %dir.display(), "loading queries from directory of JSON files");
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
      .with_context(|| format!("reading {}", dir.display()))?
      .filter_map(|e| e.ok())
      .map(|e| e.path())
      .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
      .collect();
    paths.sort();
    let mut queries = Vec::with_capacity(paths.len());
    for path in paths {
      let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
      queries.push(serde_json::from_str(&text)?);
    }
    return Ok(queries);
  }

  bail!("one of --query-file or --query-dir must be given");
}

fn write_result_csv(path: &Path, result: &ResultSet) -> Result<()> {
  let mut writer = csv::Writer::from_path(path)?;
  writer.write_record(&result.columns)?;
  for row in &result.rows {
    let record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
    writer.write_record(&record)?;
  }
  writer.flush()?;
  Ok(())
}

/// Runs every loaded query against the prepared stores. Returns the process
/// exit code: 0 iff every query succeeded, 1 otherwise (§6). A fatal
/// initialization failure (missing rollup directory, no queries found) is
/// surfaced as `Err` instead.
pub fn execute(args: RunArgs) -> Result<i32> {
  let config = args.into_config();

  if !config.rollup_dir.is_dir() {
    bail!("rollup directory not found: {}; run prepare first", config.rollup_dir.display());
  }
  let rollup_files: Vec<_> = std::fs::read_dir(&config.rollup_dir)?
    .filter_map(|e| e.ok())
    .filter(|e| e.path().extension().and_then(|e| e.to_str()) == Some("arrow"))
    .collect();
  if rollup_files.is_empty() {
    bail!("no rollup files found in {}; run prepare first", config.rollup_dir.display());
  }
  info!(count = rollup_files.len(), "found rollup files");

  std::fs::create_dir_all(&config.output_dir).context("failed to create output directory")?;

  let queries = load_queries(&config)?;
  if queries.is_empty() {
    bail!("no queries loaded");
  }
  info!(count = queries.len(), "loaded queries");

  let fallback_conn = open_read_only(&config.fallback_path).context("failed to open fallback store")?;

  // Any cube whose recorded timezone disagrees with the fallback store's is
  // a StoreError the run phase should refuse to start against (§4.3, §7);
  // both engines must agree on what "day"/"hour"/"week" mean.
  let fallback_tz = read_fallback_timezone(&fallback_conn).context("failed to read fallback timezone")?;
  let store = CubeStore::open(config.rollup_dir.clone(), fallback_tz);

  let workload_started = Instant::now();
  let mut failures = 0usize;
  for (idx, raw) in queries.into_iter().enumerate() {
    let n = idx + 1;
    let query_started = Instant::now();

    let outcome = parse_query_value(raw.clone())
      .map_err(anyhow::Error::from)
      .and_then(|pattern| run_query(&pattern, &store, &fallback_conn).map_err(anyhow::Error::from));

    match outcome {
      Ok(result) => {
        let rows = result.rows.len();
        let out_path = config.output_dir.join(format!("q{}.csv", n));
        if let Err(e) = write_result_csv(&out_path, &result) {
          error!(query = n, error = %e, "failed to write result CSV");
          failures += 1;
          continue;
        }
        info!(
          query = n,
          rows,
          elapsed_ms = query_started.elapsed().as_millis(),
          path = %out_path.display(),
          "query succeeded"
        );
      }
      Err(e) => {
        error!(query = n, error = %e, query_json = %raw, "query failed");
        failures += 1;
      }
    }
  }

  let workload_ms = workload_started.elapsed().as_millis();
  if workload_ms > RUN_BUDGET_MS {
    tracing::warn!(workload_ms, budget_ms = RUN_BUDGET_MS, "workload exceeded soft time budget");
  }

  if failures > 0 {
    error!(failures, "one or more queries failed");
    Ok(1)
  } else {
    Ok(0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cube_core::result::OutputValue;

  #[test]
  fn test_load_queries_from_file_accepts_bare_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q.json");
    std::fs::write(&path, r#"{"select": ["day"]}"#).unwrap();
    let config = RunConfig {
      rollup_dir: dir.path().into(),
      fallback_path: dir.path().join("fallback.duckdb"),
      query_file: Some(path),
      query_dir: None,
      output_dir: dir.path().join("out"),
    };
    let queries = load_queries(&config).unwrap();
    assert_eq!(queries.len(), 1);
  }

  #[test]
  fn test_load_queries_from_file_accepts_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q.json");
    std::fs::write(&path, r#"[{"select": ["day"]}, {"select": ["country"]}]"#).unwrap();
    let config = RunConfig {
      rollup_dir: dir.path().into(),
      fallback_path: dir.path().join("fallback.duckdb"),
      query_file: Some(path),
      query_dir: None,
      output_dir: dir.path().join("out"),
    };
    let queries = load_queries(&config).unwrap();
    assert_eq!(queries.len(), 2);
  }

  #[test]
  fn test_load_queries_from_dir_sorts_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let qdir = dir.path().join("queries");
    std::fs::create_dir_all(&qdir).unwrap();
    std::fs::write(qdir.join("b.json"), r#"{"select": ["country"]}"#).unwrap();
    std::fs::write(qdir.join("a.json"), r#"{"select": ["day"]}"#).unwrap();
    let config = RunConfig {
      rollup_dir: dir.path().into(),
      fallback_path: dir.path().join("fallback.duckdb"),
      query_file: None,
      query_dir: Some(qdir),
      output_dir: dir.path().join("out"),
    };
    let queries = load_queries(&config).unwrap();
    assert_eq!(queries[0]["select"][0], "day");
    assert_eq!(queries[1]["select"][0], "country");
  }

  #[test]
  fn test_load_queries_without_file_or_dir_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
      rollup_dir: dir.path().into(),
      fallback_path: dir.path().join("fallback.duckdb"),
      query_file: None,
      query_dir: None,
      output_dir: dir.path().join("out"),
    };
    assert!(load_queries(&config).is_err());
  }

  #[test]
  fn test_write_result_csv_renders_null_as_empty_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q1.csv");
    let result = ResultSet {
      columns: vec!["day".into(), "SUM(bid_price)".into()],
      rows: vec![vec![OutputValue::Str("2024-06-01".into()), OutputValue::Null]],
    };
    write_result_csv(&path, &result).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "day,SUM(bid_price)\n2024-06-01,\n");
  }
}

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

//! `cube-cli prepare`: the ingest side of the engine (C2, C3) plus both
//! persistence backends (C4, C5). Fatal on any ingestion or build-invariant
//! error, per spec.md §7's "all-or-nothing" prepare policy — no cube and no
//! fallback file are left half-written on failure.

use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::{build_threads_from_env, PrepareConfig};
use cube_ingest::{CubeBuilder, Ingestor, ProcessState, ProcessTracker, DEFAULT_BATCH_SIZE, FOLD_THRESHOLD};
use cube_store::{CubeStore, FallbackStoreBuilder};

/// Soft wall-clock budget for the whole prepare run (§5 "Cancellation &
/// timeouts"). Exceeding it only logs a warning; it never fails the run.
const PREPARE_BUDGET_SECS: u64 = 600;

#[derive(Args, Debug)]
pub struct PrepareArgs {
  /// Directory of input CSV event files (discovered recursively by glob).
  #[arg(long)]
  data_dir: String,

  /// Directory to write the cube family's Arrow IPC files and sidecar metadata.
  #[arg(long)]
  rollup_dir: std::path::PathBuf,

  /// Path to the DuckDB fallback database file to create.
  #[arg(long)]
  fallback_path: std::path::PathBuf,

  /// IANA timezone name used to compute all derived time dimensions.
  #[arg(long, default_value = "UTC")]
  timezone: String,

  /// FIFO fan-in threshold for the cube builder (§4.3's `K`).
  #[arg(long, default_value_t = FOLD_THRESHOLD)]
  fold_threshold: usize,

  /// Rows per streamed ingest batch (§4.2's `B`).
  #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
  batch_rows: usize,

  /// Rayon worker-thread count; overrides `CUBE_BUILD_THREADS` if set.
  #[arg(long)]
  threads: Option<usize>,
}

impl PrepareArgs {
  fn into_config(self) -> PrepareConfig {
    PrepareConfig {
      data_dir: self.data_dir,
      rollup_dir: self.rollup_dir,
      fallback_path: self.fallback_path,
      timezone: self.timezone,
      fold_threshold: self.fold_threshold,
      batch_rows: self.batch_rows,
    }
  }
}

/// Runs the full prepare pipeline. Returns the process exit code (always 0
/// here; any fatal error is surfaced as `Err` instead, per spec.md §6 "exit
/// 0 on success, non-zero on any fatal error").
pub fn execute(args: PrepareArgs) -> Result<i32> {
  let threads = args.threads.or_else(build_threads_from_env);
  if let Some(n) = threads {
    rayon::ThreadPoolBuilder::new()
      .num_threads(n)
      .build_global()
      .context("failed to configure rayon thread pool")?;
    info!(threads = n, "configured rayon global thread pool");
  }

  let config = args.into_config();
  let started = Instant::now();
  let tracker = ProcessTracker::new();

  let tz = chrono_tz::Tz::from_str(&config.timezone)
    .map_err(|_| anyhow::anyhow!("unrecognized timezone: {}", config.timezone))?;

  tracker.start("discover");
  info!(data_dir = %config.data_dir, "discovering input CSV files");
  let mut ingestor = Ingestor::open(&config.data_dir, tz, config.batch_rows)?;
  let total_files = ingestor.total_files();
  info!(count = total_files, "found input files");
  tracker.complete(ProcessState::Success, Some(total_files as u64));

  let progress = ProgressBar::new(total_files as u64);
  progress.set_style(
    ProgressStyle::default_bar()
      .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} files, {msg} rows")
      .unwrap_or_else(|_| ProgressStyle::default_bar())
      .progress_chars("##-"),
  );

  let mut builder = CubeBuilder::with_fold_threshold(config.timezone.clone(), config.fold_threshold);

  let fallback_builder = FallbackStoreBuilder::create(&config.fallback_path)
    .context("failed to create fallback store")?;

  tracker.start("ingest+build");
  while let Some(batch) = ingestor.next() {
    let batch = batch.inspect_err(|e| tracker.fail(e.to_string()))?;
    builder.ingest_batch(&batch).inspect_err(|e| tracker.fail(e.to_string()))?;
    fallback_builder.append_batch(&batch).inspect_err(|e| tracker.fail(e.to_string()))?;

    progress.set_position(ingestor.files_consumed() as u64);
    progress.set_message(builder.rows_seen().to_string());
  }
  progress.finish_with_message(builder.rows_seen().to_string());
  tracker.complete(ProcessState::Success, Some(builder.rows_seen()));

  info!(rows = builder.rows_seen(), "folding remaining batches and finalizing cube family");
  tracker.start("finalize");
  let cubes = match builder.finalize(total_files) {
    Ok(cubes) => cubes,
    Err(e) => {
      tracker.fail(e.to_string());
      return Err(e.into());
    }
  };
  tracker.complete(ProcessState::Success, Some(cubes.iter().map(|c| c.meta.row_count).sum()));

  tracker.start("persist");
  std::fs::create_dir_all(&config.rollup_dir).context("failed to create rollup directory")?;
  let store = CubeStore::open(config.rollup_dir.clone(), config.timezone.clone());
  for cube in &cubes {
    store.persist(cube)?;
    info!(cube = %cube.meta.name, rows = cube.meta.row_count, "persisted cube");
  }
  fallback_builder.finalize(&config.timezone, total_files).context("failed to finalize fallback store")?;
  info!("fallback store clustered and analyzed");
  tracker.complete(ProcessState::Success, None);

  let elapsed = started.elapsed();
  if elapsed.as_secs() > PREPARE_BUDGET_SECS {
    warn!(elapsed_secs = elapsed.as_secs(), budget_secs = PREPARE_BUDGET_SECS, "prepare exceeded soft wall-clock budget");
  }
  for stage in tracker.snapshot() {
    debug!(stage = %stage.process_name, state = ?stage.state, "prepare stage summary");
  }
  info!(elapsed_secs = elapsed.as_secs_f64(), "prepare complete");

  Ok(0)
}

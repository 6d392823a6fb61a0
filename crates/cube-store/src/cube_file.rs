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

//! The cube store (C4, §4.4, §6): one Arrow IPC file per cube, LZ4-framed,
//! with a JSON sidecar carrying the metadata the router and the run-start
//! timezone check both need. `CubeStore::load` caches decoded cubes behind
//! an `Arc` so repeated loads are idempotent and cheap.

use crate::error::{StoreError, StoreResult};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::ipc::writer::{FileWriter, IpcWriteOptions};
use arrow::ipc::{reader::FileReader, CompressionType};
use arrow::record_batch::RecordBatch;
use cube_core::cube::{Cube, CubeMeta};
use cube_core::event::{DimValue, Dimension};
use cube_core::Partials;
use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

const MEASURE_FIELDS_F64: [&str; 6] = ["bid_sum", "bid_min", "bid_max", "tot_sum", "tot_min", "tot_max"];
const MEASURE_FIELDS_U64: [&str; 3] = ["bid_cnt", "tot_cnt", "row_cnt"];

fn dim_is_string(name: &str) -> bool {
  Dimension::from_str(name).map(|d| d.is_string_typed()).unwrap_or(true)
}

/// Deterministic row order — Arrow files are a persisted artifact and byte-
/// identical rebuilds (§8 property 5) require a stable sort, not hash order.
fn sorted_rows(cube: &Cube) -> Vec<(&Vec<DimValue>, &Partials)> {
  let mut rows: Vec<(&Vec<DimValue>, &Partials)> = cube.rows.iter().collect();
  rows.sort_by(|a, b| a.0.cmp(b.0));
  rows
}

fn cube_to_record_batch(cube: &Cube) -> StoreResult<RecordBatch> {
  let rows = sorted_rows(cube);
  let mut fields = Vec::new();
  let mut columns: Vec<ArrayRef> = Vec::new();

  for (i, name) in cube.meta.dimensions.iter().enumerate() {
    if dim_is_string(name) {
      let arr: StringArray =
        rows.iter().map(|(key, _)| key[i].as_str().unwrap_or("").to_string()).collect();
      fields.push(Field::new(name, DataType::Utf8, false));
      columns.push(Arc::new(arr));
    } else {
      let arr: Int64Array = rows.iter().map(|(key, _)| key[i].as_int().unwrap_or_default()).collect();
      fields.push(Field::new(name, DataType::Int64, false));
      columns.push(Arc::new(arr));
    }
  }

  macro_rules! f64_column {
    ($name:expr, $accessor:ident) => {{
      let arr: Float64Array = rows.iter().map(|(_, p)| p.$accessor).collect();
      fields.push(Field::new($name, DataType::Float64, false));
      columns.push(Arc::new(arr) as ArrayRef);
    }};
  }
  macro_rules! u64_column {
    ($name:expr, $accessor:ident) => {{
      let arr: UInt64Array = rows.iter().map(|(_, p)| p.$accessor).collect();
      fields.push(Field::new($name, DataType::UInt64, false));
      columns.push(Arc::new(arr) as ArrayRef);
    }};
  }

  f64_column!("bid_sum", bid_sum);
  u64_column!("bid_cnt", bid_cnt);
  f64_column!("bid_min", bid_min);
  f64_column!("bid_max", bid_max);
  f64_column!("tot_sum", tot_sum);
  u64_column!("tot_cnt", tot_cnt);
  f64_column!("tot_min", tot_min);
  f64_column!("tot_max", tot_max);
  u64_column!("row_cnt", row_cnt);

  let schema = Arc::new(Schema::new(fields));
  RecordBatch::try_new(schema, columns).map_err(StoreError::from)
}

fn record_batch_to_cube(meta: CubeMeta, batch: &RecordBatch) -> StoreResult<Cube> {
  let mut cube = Cube::new(meta.clone());
  let n_dims = meta.dimensions.len();

  let dim_cols: Vec<ArrayRef> = (0..n_dims).map(|i| batch.column(i).clone()).collect();
  let measure_start = n_dims;

  let get_f64 = |col_idx: usize, row: usize| -> StoreResult<f64> {
    batch
      .column(col_idx)
      .as_any()
      .downcast_ref::<Float64Array>()
      .map(|a| a.value(row))
      .ok_or_else(|| StoreError::Corrupt { path: meta.name.clone(), reason: "expected f64 column".into() })
  };
  let get_u64 = |col_idx: usize, row: usize| -> StoreResult<u64> {
    batch
      .column(col_idx)
      .as_any()
      .downcast_ref::<UInt64Array>()
      .map(|a| a.value(row))
      .ok_or_else(|| StoreError::Corrupt { path: meta.name.clone(), reason: "expected u64 column".into() })
  };

  for row in 0..batch.num_rows() {
    let mut key = Vec::with_capacity(n_dims);
    for (i, name) in meta.dimensions.iter().enumerate() {
      let col = &dim_cols[i];
      let value = if dim_is_string(name) {
        let arr = col.as_any().downcast_ref::<StringArray>().ok_or_else(|| StoreError::Corrupt {
          path: meta.name.clone(),
          reason: format!("dimension {} expected string column", name),
        })?;
        DimValue::Str(arr.value(row).to_string())
      } else {
        let arr = col.as_any().downcast_ref::<Int64Array>().ok_or_else(|| StoreError::Corrupt {
          path: meta.name.clone(),
          reason: format!("dimension {} expected int column", name),
        })?;
        DimValue::Int(arr.value(row))
      };
      key.push(value);
    }

    let partials = Partials {
      bid_sum: get_f64(measure_start, row)?,
      bid_cnt: get_u64(measure_start + 1, row)?,
      bid_min: get_f64(measure_start + 2, row)?,
      bid_max: get_f64(measure_start + 3, row)?,
      tot_sum: get_f64(measure_start + 4, row)?,
      tot_cnt: get_u64(measure_start + 5, row)?,
      tot_min: get_f64(measure_start + 6, row)?,
      tot_max: get_f64(measure_start + 7, row)?,
      row_cnt: get_u64(measure_start + 8, row)?,
    };
    cube.rows.insert(key, partials);
  }

  Ok(cube)
}

fn arrow_path(dir: &Path, name: &str) -> PathBuf {
  dir.join(format!("{}.arrow", name))
}

fn meta_path(dir: &Path, name: &str) -> PathBuf {
  dir.join(format!("{}.meta.json", name))
}

/// Writes `cube` as `<dir>/<name>.arrow` (LZ4-framed IPC) plus
/// `<dir>/<name>.meta.json` (§6 "Cube files").
pub fn write_cube(dir: &Path, cube: &Cube) -> StoreResult<()> {
  let batch = cube_to_record_batch(cube)?;
  let file = File::create(arrow_path(dir, &cube.meta.name))
    .map_err(|e| StoreError::Io { path: dir.display().to_string(), source: e })?;
  let options = IpcWriteOptions::default()
    .try_with_compression(Some(CompressionType::LZ4_FRAME))
    .map_err(StoreError::from)?;
  let mut writer = FileWriter::try_new_with_options(BufWriter::new(file), &batch.schema(), options)
    .map_err(StoreError::from)?;
  writer.write(&batch).map_err(StoreError::from)?;
  writer.finish().map_err(StoreError::from)?;

  let meta_json = serde_json::to_vec_pretty(&cube.meta)
    .map_err(|e| StoreError::Meta { path: cube.meta.name.clone(), source: e })?;
  std::fs::write(meta_path(dir, &cube.meta.name), meta_json)
    .map_err(|e| StoreError::Io { path: dir.display().to_string(), source: e })?;
  Ok(())
}

fn read_meta(dir: &Path, name: &str) -> StoreResult<CubeMeta> {
  let path = meta_path(dir, name);
  let bytes =
    std::fs::read(&path).map_err(|_| StoreError::NotFound(path.display().to_string()))?;
  serde_json::from_slice(&bytes).map_err(|e| StoreError::Meta { path: path.display().to_string(), source: e })
}

fn read_cube(dir: &Path, name: &str) -> StoreResult<Cube> {
  let meta = read_meta(dir, name)?;
  let path = arrow_path(dir, name);
  let file = File::open(&path).map_err(|_| StoreError::NotFound(path.display().to_string()))?;
  // SAFETY: the mapped file is immutable store output written once by `write_cube`
  // and never mutated afterward (§3.3 lifecycle, §5 "shared-resource policy").
  let mmap = unsafe { Mmap::map(&file) }.map_err(|e| StoreError::Io { path: path.display().to_string(), source: e })?;
  let mut reader = FileReader::try_new(Cursor::new(&mmap[..]), None).map_err(StoreError::from)?;
  let batch = reader
    .next()
    .ok_or_else(|| StoreError::Corrupt { path: path.display().to_string(), reason: "empty IPC file".into() })?
    .map_err(StoreError::from)?;
  record_batch_to_cube(meta, &batch)
}

/// Loads, caches, and (at run start) timezone-checks the persisted cube
/// family. Not `Sync` across threads by design — the run phase is
/// predominantly single-threaded at the control-flow level (§5).
pub struct CubeStore {
  dir: PathBuf,
  timezone: String,
  cache: Mutex<HashMap<String, Arc<Cube>>>,
}

impl CubeStore {
  pub fn open(dir: impl Into<PathBuf>, timezone: impl Into<String>) -> Self {
    Self { dir: dir.into(), timezone: timezone.into(), cache: Mutex::new(HashMap::new()) }
  }

  pub fn persist(&self, cube: &Cube) -> StoreResult<()> {
    write_cube(&self.dir, cube)
  }

  /// Reads just the sidecar metadata — the router (C7) only ever needs
  /// `row_count` and `dimensions`, so this avoids decoding the Arrow body.
  pub fn meta(&self, name: &str) -> StoreResult<CubeMeta> {
    read_meta(&self.dir, name)
  }

  pub fn load(&self, name: &str) -> StoreResult<Arc<Cube>> {
    if let Some(cube) = self.cache.lock().expect("cube store cache mutex poisoned").get(name) {
      return Ok(cube.clone());
    }
    let cube = read_cube(&self.dir, name)?;
    if cube.meta.timezone != self.timezone {
      return Err(StoreError::TimezoneMismatch {
        cube: name.to_string(),
        cube_tz: cube.meta.timezone.clone(),
        run_tz: self.timezone.clone(),
      });
    }
    let cube = Arc::new(cube);
    self.cache.lock().expect("cube store cache mutex poisoned").insert(name.to_string(), cube.clone());
    Ok(cube)
  }

  /// Eagerly loads every cube whose `.arrow` file is at or under
  /// `limit_mb` into the cache (§4.4).
  pub fn preload_all(&self, limit_mb: u64) -> StoreResult<()> {
    let limit_bytes = limit_mb * 1024 * 1024;
    for spec in cube_core::CUBE_FAMILY {
      let path = arrow_path(&self.dir, spec.name);
      let Ok(metadata) = std::fs::metadata(&path) else { continue };
      if metadata.len() <= limit_bytes {
        self.load(spec.name)?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cube_core::catalog::spec_by_name;

  fn sample_cube() -> Cube {
    let spec = spec_by_name("country_type").unwrap();
    let mut cube = Cube::new(CubeMeta {
      name: spec.name.to_string(),
      dimensions: spec.dimensions.iter().map(|d| d.as_str().to_string()).collect(),
      measures: cube_core::MEASURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
      timezone: "UTC".into(),
      source_file_count: 2,
      build_time_secs: 1.23,
      row_count: 3,
    });
    cube.rows.insert(
      vec![DimValue::Str("US".into()), DimValue::Str("click".into())],
      Partials::from_measures(Some(1.0), Some(2.0)),
    );
    cube.rows.insert(
      vec![DimValue::Str("JP".into()), DimValue::Str("click".into())],
      Partials::from_measures(None, Some(5.0)),
    );
    cube
  }

  #[test]
  fn test_persist_then_load_round_trips_rows() {
    let dir = tempfile::tempdir().unwrap();
    let cube = sample_cube();
    let store = CubeStore::open(dir.path(), "UTC");
    store.persist(&cube).unwrap();

    let loaded = store.load("country_type").unwrap();
    assert_eq!(loaded.rows.len(), cube.rows.len());
    let us = loaded.rows.get(&vec![DimValue::Str("US".into()), DimValue::Str("click".into())]).unwrap();
    assert_eq!(us.bid_sum_or_null(), Some(1.0));
    assert_eq!(us.tot_sum_or_null(), Some(2.0));
  }

  #[test]
  fn test_load_is_cached_and_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = CubeStore::open(dir.path(), "UTC");
    store.persist(&sample_cube()).unwrap();
    let a = store.load("country_type").unwrap();
    let b = store.load("country_type").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
  }

  #[test]
  fn test_load_rejects_timezone_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let store = CubeStore::open(dir.path(), "America/New_York");
    store.persist(&sample_cube()).unwrap();
    let err = store.load("country_type").unwrap_err();
    assert!(matches!(err, StoreError::TimezoneMismatch { .. }));
  }

  #[test]
  fn test_load_missing_cube_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = CubeStore::open(dir.path(), "UTC");
    let err = store.load("nonexistent").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
  }

  #[test]
  fn test_meta_reads_without_loading_full_cube() {
    let dir = tempfile::tempdir().unwrap();
    let store = CubeStore::open(dir.path(), "UTC");
    store.persist(&sample_cube()).unwrap();
    let meta = store.meta("country_type").unwrap();
    assert_eq!(meta.row_count, 3);
    assert_eq!(meta.source_file_count, 2);
  }

  #[test]
  fn test_preload_all_skips_oversized_cubes() {
    let dir = tempfile::tempdir().unwrap();
    let store = CubeStore::open(dir.path(), "UTC");
    store.persist(&sample_cube()).unwrap();
    store.preload_all(0).unwrap();
    assert!(store.cache.lock().unwrap().is_empty());
  }
}

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

//! End-to-end coverage of the two phases wired together: ingest a handful of
//! CSV rows into a cube family plus a fallback store, then route and execute
//! queries against both, the same way `cube-cli prepare` and `cube-cli run`
//! do internally. Exercised through the library surface rather than by
//! spawning the binary, since that surface is what actually carries the
//! contract between phases.

use cube_ingest::{CubeBuilder, Ingestor};
use cube_query::{parse_query, run_query};
use cube_store::{open_read_only, read_fallback_timezone, CubeStore, FallbackStoreBuilder};
use std::io::Write;

const HEADER: &str = "ts,type,auction_id,advertiser_id,publisher_id,bid_price,user_id,total_price,country\n";

fn write_csv(dir: &std::path::Path, name: &str, rows: &[&str]) {
  let mut f = std::fs::File::create(dir.join(name)).unwrap();
  write!(f, "{}", HEADER).unwrap();
  for row in rows {
    writeln!(f, "{}", row).unwrap();
  }
}

/// Runs the full prepare pipeline against a small fixture, writing a cube
/// family and a fallback store under `out_dir`.
fn prepare_fixture(data_dir: &std::path::Path, out_dir: &std::path::Path) {
  let rollup_dir = out_dir.join("rollups");
  let fallback_path = out_dir.join("fallback.duckdb");
  std::fs::create_dir_all(&rollup_dir).unwrap();

  let mut ingestor = Ingestor::open(data_dir.to_str().unwrap(), chrono_tz::UTC, 64).unwrap();
  let total_files = ingestor.total_files();

  let mut builder = CubeBuilder::with_fold_threshold("UTC", 2);
  let fallback_builder = FallbackStoreBuilder::create(&fallback_path).unwrap();

  while let Some(batch) = ingestor.next() {
    let batch = batch.unwrap();
    builder.ingest_batch(&batch).unwrap();
    fallback_builder.append_batch(&batch).unwrap();
  }

  let cubes = builder.finalize(total_files).unwrap();
  let store = CubeStore::open(rollup_dir, "UTC");
  for cube in &cubes {
    store.persist(cube).unwrap();
  }
  fallback_builder.finalize("UTC", total_files).unwrap();
}

#[test]
fn test_prepare_then_run_routes_group_by_day_to_a_cube() {
  let data_dir = tempfile::tempdir().unwrap();
  write_csv(
    data_dir.path(),
    "a.csv",
    &[
      "1717243200000,click,a1,10,20,1.5,u1,2.5,US",
      "1717243260000,click,a2,10,20,2.5,u2,3.5,US",
      "1717243320000,impression,a3,11,20,,u3,,CA",
    ],
  );

  let out_dir = tempfile::tempdir().unwrap();
  prepare_fixture(data_dir.path(), out_dir.path());

  let rollup_dir = out_dir.path().join("rollups");
  let fallback_path = out_dir.path().join("fallback.duckdb");

  let conn = open_read_only(&fallback_path).unwrap();
  let tz = read_fallback_timezone(&conn).unwrap();
  assert_eq!(tz, "UTC");

  let store = CubeStore::open(rollup_dir, tz);
  let pattern = parse_query(r#"{"select": ["day", "type", {"SUM": "bid_price"}, {"COUNT": "*"}]}"#).unwrap();
  let result = run_query(&pattern, &store, &conn).unwrap();

  assert_eq!(result.columns, vec!["day", "type", "SUM(bid_price)", "count_star"]);
  let total_rows: i64 = result
    .rows
    .iter()
    .map(|row| match &row[3] {
      cube_core::OutputValue::Int(n) => *n,
      other => panic!("unexpected COUNT(*) value: {other:?}"),
    })
    .sum();
  assert_eq!(total_rows, 3);
}

#[test]
fn test_prepare_then_run_falls_back_for_a_column_no_cube_carries() {
  let data_dir = tempfile::tempdir().unwrap();
  write_csv(
    data_dir.path(),
    "a.csv",
    &[
      "1717243200000,click,a1,10,20,1.5,u1,2.5,US",
      "1717243260000,click,a2,10,99,2.5,u2,3.5,US",
    ],
  );

  let out_dir = tempfile::tempdir().unwrap();
  prepare_fixture(data_dir.path(), out_dir.path());

  let rollup_dir = out_dir.path().join("rollups");
  let fallback_path = out_dir.path().join("fallback.duckdb");
  let conn = open_read_only(&fallback_path).unwrap();
  let tz = read_fallback_timezone(&conn).unwrap();
  let store = CubeStore::open(rollup_dir, tz);

  // No precomputed cube groups by publisher_id; this must fall back to the
  // raw events table rather than fail.
  let pattern = parse_query(r#"{"select": ["publisher_id", {"COUNT": "*"}]}"#).unwrap();
  let result = run_query(&pattern, &store, &conn).unwrap();
  assert_eq!(result.rows.len(), 2);
}

#[test]
fn test_prepare_is_fatal_on_a_malformed_row() {
  let data_dir = tempfile::tempdir().unwrap();
  write_csv(data_dir.path(), "a.csv", &["1717243200000,bounce,a1,10,20,1.0,u1,1.0,US"]);

  let mut ingestor = Ingestor::open(data_dir.path().to_str().unwrap(), chrono_tz::UTC, 64).unwrap();
  let first = ingestor.next().unwrap();
  assert!(first.is_err());
}

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

//! The fallback store builder (C5, §4.5, §6): one physically-clustered
//! `events` table in an embedded DuckDB file, loaded directly from the same
//! `EventBatch`es the cube builder (C3) consumes — no intermediate CSV
//! re-encoding.

use crate::error::FallbackResult;
use cube_ingest::batch::EventBatch;
use duckdb::{params, Connection};
use std::path::Path;
use tracing::info;

const CREATE_EVENTS_SQL: &str = "
CREATE TABLE events (
  day VARCHAR,
  week VARCHAR,
  hour VARCHAR,
  minute VARCHAR,
  type VARCHAR,
  country VARCHAR,
  advertiser_id BIGINT,
  publisher_id BIGINT,
  bid_price DOUBLE,
  total_price DOUBLE
)";

/// Builds the fallback store: create schema, bulk-append every batch,
/// cluster by `(week, country, type)`, refresh statistics, and record
/// build metadata for the run-start timezone check.
pub struct FallbackStoreBuilder {
  conn: Connection,
}

impl FallbackStoreBuilder {
  pub fn create(path: &Path) -> FallbackResult<Self> {
    if path.exists() {
      let _ = std::fs::remove_file(path);
    }
    let conn = Connection::open(path)?;
    conn.execute_batch(CREATE_EVENTS_SQL)?;
    Ok(Self { conn })
  }

  /// Appends one ingestor batch (§4.2) to `events` via DuckDB's row
  /// appender, preserving nulls in `bid_price`/`total_price`. Reads
  /// straight off the `EventBatch`es C2 already produces, no intermediate
  /// CSV re-encoding.
  pub fn append_batch(&self, batch: &EventBatch) -> FallbackResult<()> {
    let mut appender = self.conn.appender("events")?;
    for (event, derived) in batch.events.iter().zip(batch.derived.iter()) {
      appender.append_row(params![
        derived.day,
        derived.week,
        derived.hour,
        derived.minute,
        event.event_type.as_str(),
        event.country,
        event.advertiser_id,
        event.publisher_id,
        event.bid_price,
        event.total_price,
      ])?;
    }
    appender.flush()?;
    Ok(())
  }

  /// Physically clusters `events` by `(week, country, type)` (§4.5's
  /// high-selectivity GROUP BY prefix), refreshes planner statistics, and
  /// records the pinned timezone and source file count for the run-start
  /// cross-engine check (§4.3, §7).
  pub fn finalize(self, timezone: &str, source_file_count: usize) -> FallbackResult<()> {
    info!("clustering fallback events table by (week, country, type)");
    self.conn.execute_batch(
      "CREATE TABLE events_sorted AS SELECT * FROM events ORDER BY week, country, type;
       DROP TABLE events;
       ALTER TABLE events_sorted RENAME TO events;
       ANALYZE events;",
    )?;
    self.conn.execute_batch("CREATE TABLE _meta (timezone VARCHAR, source_file_count BIGINT)")?;
    self.conn.execute(
      "INSERT INTO _meta (timezone, source_file_count) VALUES (?, ?)",
      params![timezone, source_file_count as i64],
    )?;
    Ok(())
  }
}

/// Reads back the pinned timezone recorded by `finalize` (used by the run
/// phase's cross-engine agreement check).
pub fn read_fallback_timezone(conn: &Connection) -> FallbackResult<String> {
  let tz: String = conn.query_row("SELECT timezone FROM _meta LIMIT 1", [], |row| row.get(0))?;
  Ok(tz)
}

pub fn open_read_only(path: &Path) -> FallbackResult<Connection> {
  let conn = Connection::open(path)?;
  Ok(conn)
}

#[cfg(test)]
mod tests {
  use super::*;
  use cube_core::time::DerivedTime;
  use cube_core::{Event, EventType};

  fn fixture_batch() -> EventBatch {
    EventBatch {
      events: vec![Event {
        ts: 1_717_245_296_000,
        event_type: EventType::Click,
        auction_id: "a1".into(),
        advertiser_id: 1,
        publisher_id: 2,
        bid_price: Some(1.5),
        user_id: "u1".into(),
        total_price: None,
        country: "US".into(),
      }],
      derived: vec![DerivedTime {
        day: "2024-06-01".into(),
        hour: "2024-06-01 12".into(),
        minute: "2024-06-01 12:34".into(),
        week: "2024-W22".into(),
      }],
    }
  }

  #[test]
  fn test_create_then_append_then_finalize() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fallback.duckdb");
    let builder = FallbackStoreBuilder::create(&path).unwrap();
    builder.append_batch(&fixture_batch()).unwrap();
    builder.finalize("UTC", 1).unwrap();

    let conn = open_read_only(&path).unwrap();
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |r| r.get(0)).unwrap();
    assert_eq!(count, 1);
    let tz = read_fallback_timezone(&conn).unwrap();
    assert_eq!(tz, "UTC");
  }

  #[test]
  fn test_null_bid_price_round_trips_as_null() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fallback.duckdb");
    let builder = FallbackStoreBuilder::create(&path).unwrap();
    builder.append_batch(&fixture_batch()).unwrap();
    builder.finalize("UTC", 1).unwrap();

    let conn = open_read_only(&path).unwrap();
    let total_price: Option<f64> =
      conn.query_row("SELECT total_price FROM events LIMIT 1", [], |r| r.get(0)).unwrap();
    assert_eq!(total_price, None);
  }
}

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

//! C1: epoch-ms -> canonical derived time dimensions, in a pinned timezone.
//!
//! Every function here is pure: same `(ts, tz)` in, same string out, every
//! time. The pinned timezone is carried as metadata alongside every cube and
//! the fallback store (see `cube-store`) so the run phase can refuse to
//! start if the two disagree (§4.3, §7 StoreError).

use crate::error::{Error, Result};
use chrono::{Datelike, TimeZone};
use chrono_tz::Tz;

/// `YYYY-MM-DD`. Calendar date, never day-of-year — §9 is explicit that the
/// legacy day-of-year representation is not part of this engine.
pub fn encode_day(ts_ms: i64, tz: &Tz) -> Result<String> {
  let dt = to_local(ts_ms, tz)?;
  Ok(dt.format("%Y-%m-%d").to_string())
}

/// `YYYY-MM-DD HH` (24-hour).
pub fn encode_hour(ts_ms: i64, tz: &Tz) -> Result<String> {
  let dt = to_local(ts_ms, tz)?;
  Ok(dt.format("%Y-%m-%d %H").to_string())
}

/// `YYYY-MM-DD HH:MM`.
pub fn encode_minute(ts_ms: i64, tz: &Tz) -> Result<String> {
  let dt = to_local(ts_ms, tz)?;
  Ok(dt.format("%Y-%m-%d %H:%M").to_string())
}

/// ISO week, `YYYY-Www`. Always the ISO basis (`chrono::IsoWeek`) — never the
/// `%U`/`%W` US-style week number the original source mixed in inconsistently
/// (§9's flagged open question; resolved in DESIGN.md by always using ISO).
pub fn encode_week(ts_ms: i64, tz: &Tz) -> Result<String> {
  let dt = to_local(ts_ms, tz)?;
  let iso = dt.iso_week();
  Ok(format!("{:04}-W{:02}", iso.year(), iso.week()))
}

/// All four derived columns for one timestamp, computed in one pass so a
/// batch-level encoder (`cube-ingest`) only decomposes `ts` into a
/// `DateTime<Tz>` once per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedTime {
  pub day: String,
  pub hour: String,
  pub minute: String,
  pub week: String,
}

pub fn encode_all(ts_ms: i64, tz: &Tz) -> Result<DerivedTime> {
  let dt = to_local(ts_ms, tz)?;
  let iso = dt.iso_week();
  Ok(DerivedTime {
    day: dt.format("%Y-%m-%d").to_string(),
    hour: dt.format("%Y-%m-%d %H").to_string(),
    minute: dt.format("%Y-%m-%d %H:%M").to_string(),
    week: format!("{:04}-W{:02}", iso.year(), iso.week()),
  })
}

fn to_local(ts_ms: i64, tz: &Tz) -> Result<chrono::DateTime<Tz>> {
  let utc = chrono::DateTime::from_timestamp_millis(ts_ms)
    .ok_or_else(|| Error::TimeDecode(ts_ms, tz.to_string()))?;
  Ok(tz.from_utc_datetime(&utc.naive_utc()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono_tz::UTC;

  // 2024-06-01T12:34:56.000Z
  const SAMPLE_TS: i64 = 1_717_245_296_000;

  #[test]
  fn test_encode_day() {
    assert_eq!(encode_day(SAMPLE_TS, &UTC).unwrap(), "2024-06-01");
  }

  #[test]
  fn test_encode_hour() {
    assert_eq!(encode_hour(SAMPLE_TS, &UTC).unwrap(), "2024-06-01 12");
  }

  #[test]
  fn test_encode_minute() {
    assert_eq!(encode_minute(SAMPLE_TS, &UTC).unwrap(), "2024-06-01 12:34");
  }

  #[test]
  fn test_encode_week_iso() {
    assert_eq!(encode_week(SAMPLE_TS, &UTC).unwrap(), "2024-W22");
  }

  #[test]
  fn test_encode_all_consistent_with_individual_encoders() {
    let all = encode_all(SAMPLE_TS, &UTC).unwrap();
    assert_eq!(all.day, encode_day(SAMPLE_TS, &UTC).unwrap());
    assert_eq!(all.hour, encode_hour(SAMPLE_TS, &UTC).unwrap());
    assert_eq!(all.minute, encode_minute(SAMPLE_TS, &UTC).unwrap());
    assert_eq!(all.week, encode_week(SAMPLE_TS, &UTC).unwrap());
  }

  #[test]
  fn test_derived_columns_sort_chronologically_within_a_year() {
    let t1 = SAMPLE_TS;
    let t2 = SAMPLE_TS + 86_400_000; // one day later
    let d1 = encode_all(t1, &UTC).unwrap();
    let d2 = encode_all(t2, &UTC).unwrap();
    assert!(d1.day < d2.day);
    assert!(d1.hour < d2.hour);
    assert!(d1.minute < d2.minute);
  }

  #[test]
  fn test_timezone_changes_local_wall_clock() {
    let tokyo = encode_hour(SAMPLE_TS, &chrono_tz::Asia::Tokyo).unwrap();
    let utc = encode_hour(SAMPLE_TS, &UTC).unwrap();
    assert_ne!(tokyo, utc);
  }

  #[test]
  fn test_out_of_range_timestamp_is_an_error() {
    let err = encode_day(i64::MAX, &UTC).unwrap_err();
    assert!(matches!(err, Error::TimeDecode(_, _)));
  }

  #[test]
  fn test_day_is_prefix_of_hour_and_minute() {
    let all = encode_all(SAMPLE_TS, &UTC).unwrap();
    assert!(all.hour.starts_with(&all.day));
    assert!(all.minute.starts_with(&all.hour));
  }
}

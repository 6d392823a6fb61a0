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

//! Event CSV parsing (§3.1's row shape, deliberately out of scope per §1 but
//! needed as a concrete boundary for C2). One header row, columns named
//! exactly after the event schema fields; `bid_price`/`total_price` may be
//! empty, which deserializes to `None`.

use crate::error::{IngestError, IngestResult};
use cube_core::{Event, EventType};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct EventRecord {
  ts: i64,
  #[serde(rename = "type")]
  event_type: String,
  auction_id: String,
  advertiser_id: i64,
  publisher_id: i64,
  bid_price: Option<f64>,
  user_id: String,
  total_price: Option<f64>,
  country: String,
}

/// Parses one CSV file into `Event`s, in file order. A malformed row (bad
/// event type, unparseable field) is fatal per §4.3's failure model — no
/// partial results are returned.
pub fn read_events<P: AsRef<Path>>(path: P) -> IngestResult<Vec<Event>> {
  let path_ref = path.as_ref();
  let path_str = path_ref.display().to_string();
  let file =
    std::fs::File::open(path_ref).map_err(|e| IngestError::Io { path: path_str.clone(), source: e })?;
  let mut reader = csv::Reader::from_reader(file);
  let mut events = Vec::new();

  for (idx, result) in reader.deserialize::<EventRecord>().enumerate() {
    let line = idx as u64 + 2; // header is line 1
    let record = result.map_err(|e| IngestError::Csv { path: path_str.clone(), source: e })?;
    let event_type = EventType::from_str(&record.event_type).map_err(|e| IngestError::MalformedRow {
      path: path_str.clone(),
      line,
      reason: e.to_string(),
    })?;
    events.push(Event {
      ts: record.ts,
      event_type,
      auction_id: record.auction_id,
      advertiser_id: record.advertiser_id,
      publisher_id: record.publisher_id,
      bid_price: record.bid_price,
      user_id: record.user_id,
      total_price: record.total_price,
      country: record.country,
    });
  }

  Ok(events)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "{}", contents).unwrap();
    f
  }

  const HEADER: &str = "ts,type,auction_id,advertiser_id,publisher_id,bid_price,user_id,total_price,country\n";

  #[test]
  fn test_parses_full_row() {
    let f = write_csv(&format!("{}1717245296000,click,a1,10,20,1.5,u1,2.5,US\n", HEADER));
    let events = read_events(f.path()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::Click);
    assert_eq!(events[0].bid_price, Some(1.5));
    assert_eq!(events[0].country, "US");
  }

  #[test]
  fn test_nullable_measures_parse_as_none_when_empty() {
    let f = write_csv(&format!("{}1717245296000,serve,a1,10,20,,u1,,US\n", HEADER));
    let events = read_events(f.path()).unwrap();
    assert_eq!(events[0].bid_price, None);
    assert_eq!(events[0].total_price, None);
  }

  #[test]
  fn test_unknown_event_type_is_malformed_row() {
    let f = write_csv(&format!("{}1717245296000,bounce,a1,10,20,1.0,u1,1.0,US\n", HEADER));
    let err = read_events(f.path()).unwrap_err();
    assert!(matches!(err, IngestError::MalformedRow { .. }));
  }

  #[test]
  fn test_preserves_file_order() {
    let f = write_csv(&format!(
      "{}1,click,a1,1,1,1.0,u1,1.0,US\n2,click,a2,1,1,2.0,u1,2.0,US\n",
      HEADER
    ));
    let events = read_events(f.path()).unwrap();
    assert_eq!(events[0].auction_id, "a1");
    assert_eq!(events[1].auction_id, "a2");
  }
}

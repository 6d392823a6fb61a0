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

//! The cube builder (C3, §4.3) — the hardest subsystem. Builds the whole
//! closed cube family from a stream of batches in one pass, under bounded
//! memory: an incremental fold with bounded fan-in, per cube.
//!
//! The per-batch group-by across the eleven cubes is independent work, so it
//! runs on rayon's pool — one of the two hot paths this engine parallelizes
//! internally (the other is the fallback executor in `cube-store`).

use crate::batch::EventBatch;
use crate::error::{IngestError, IngestResult};
use cube_core::cube::{Cube, CubeMeta};
use cube_core::event::{DimValue, Dimension, Event};
use cube_core::time::DerivedTime;
use cube_core::{Partials, CUBE_FAMILY, MEASURE_COLUMNS};
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;

/// `K` from §4.3: the FIFO fan-in threshold. Empirically tuned there to
/// balance amortized hash-join cost against the peak memory of pending
/// partials; not derived from any other constant in this system.
pub const FOLD_THRESHOLD: usize = 20;

type Accumulator = HashMap<Vec<DimValue>, Partials>;

fn dim_value(dim: Dimension, event: &Event, derived: &DerivedTime) -> DimValue {
  match dim {
    Dimension::Day => DimValue::Str(derived.day.clone()),
    Dimension::Hour => DimValue::Str(derived.hour.clone()),
    Dimension::Minute => DimValue::Str(derived.minute.clone()),
    Dimension::Week => DimValue::Str(derived.week.clone()),
    Dimension::Country => DimValue::Str(event.country.clone()),
    Dimension::Type => DimValue::Str(event.event_type.as_str().to_string()),
    Dimension::AdvertiserId => DimValue::Int(event.advertiser_id),
    Dimension::PublisherId => DimValue::Int(event.publisher_id),
  }
}

/// Local group-by of one batch on one cube's dimensions — `B_{c,b}` in the
/// notation of §4.3.
fn group_batch(dimensions: &[Dimension], batch: &EventBatch) -> Accumulator {
  let mut map = Accumulator::new();
  for (event, derived) in batch.events.iter().zip(batch.derived.iter()) {
    let key: Vec<DimValue> = dimensions.iter().map(|d| dim_value(*d, event, derived)).collect();
    let partial = Partials::from_measures(event.bid_price, event.total_price);
    map.entry(key).and_modify(|acc| acc.combine_in_place(&partial)).or_insert(partial);
  }
  map
}

/// Merges `other` into `acc` key by key. Because both sides are `HashMap`s
/// keyed on the full dimension tuple, this full outer join's key coalesce
/// (§4.3's "critical invariant") is structural: there is exactly one map
/// entry per key, on both sides, always — a duplicated or dropped key column
/// is not representable, unlike a table-join implementation where left/right
/// key columns are two physical columns that must be reconciled by hand.
fn merge_into(acc: &mut Accumulator, other: Accumulator) {
  for (key, partial) in other {
    acc.entry(key).and_modify(|p| p.combine_in_place(&partial)).or_insert(partial);
  }
}

/// Builds every cube in the closed family from a stream of batches, under
/// the bounded-memory fold-with-fan-in design of §4.3.
pub struct CubeBuilder {
  accumulators: HashMap<&'static str, Accumulator>,
  pending: HashMap<&'static str, Vec<Accumulator>>,
  fold_threshold: usize,
  tz_name: String,
  started: Instant,
  rows_seen: u64,
}

impl CubeBuilder {
  pub fn new(tz_name: impl Into<String>) -> Self {
    Self::with_fold_threshold(tz_name, FOLD_THRESHOLD)
  }

  /// Exposed mainly for tests, which want to exercise the fold boundary
  /// without pushing 20 full batches through.
  pub fn with_fold_threshold(tz_name: impl Into<String>, fold_threshold: usize) -> Self {
    let mut accumulators = HashMap::new();
    let mut pending = HashMap::new();
    for spec in CUBE_FAMILY {
      accumulators.insert(spec.name, Accumulator::new());
      pending.insert(spec.name, Vec::new());
    }
    Self {
      accumulators,
      pending,
      fold_threshold,
      tz_name: tz_name.into(),
      started: Instant::now(),
      rows_seen: 0,
    }
  }

  /// Folds one batch into every cube's pending FIFO, running a fold step
  /// for any cube whose FIFO just reached `fold_threshold`.
  pub fn ingest_batch(&mut self, batch: &EventBatch) -> IngestResult<()> {
    if batch.is_empty() {
      return Ok(());
    }
    let grouped: Vec<(&'static str, Accumulator)> =
      CUBE_FAMILY.par_iter().map(|spec| (spec.name, group_batch(spec.dimensions, batch))).collect();

    self.rows_seen += batch.len() as u64;
    for (name, partial) in grouped {
      let fifo = self.pending.get_mut(name).expect("every cube has a pending fifo");
      fifo.push(partial);
      if fifo.len() >= self.fold_threshold {
        self.fold_pending(name);
      }
    }
    Ok(())
  }

  fn fold_pending(&mut self, name: &'static str) {
    let drained: Vec<Accumulator> =
      self.pending.get_mut(name).expect("every cube has a pending fifo").drain(..).collect();
    let acc = self.accumulators.get_mut(name).expect("every cube has an accumulator");
    for partial in drained {
      merge_into(acc, partial);
    }
  }

  /// Runs the final fold over any remaining pending partials and emits the
  /// finished family (§4.3 "Termination"). Verifies each cube's invariants
  /// before returning — a violation is fatal and no cube is persisted.
  pub fn finalize(mut self, source_file_count: usize) -> IngestResult<Vec<Cube>> {
    let names: Vec<&'static str> = CUBE_FAMILY.iter().map(|s| s.name).collect();
    for name in &names {
      self.fold_pending(name);
    }

    let build_time_secs = self.started.elapsed().as_secs_f64();
    let mut cubes = Vec::with_capacity(CUBE_FAMILY.len());
    for spec in CUBE_FAMILY {
      let rows = self.accumulators.remove(spec.name).expect("accumulator present for every spec");
      let row_count: u64 = rows.values().map(|p| p.row_cnt).sum();
      let meta = CubeMeta {
        name: spec.name.to_string(),
        dimensions: spec.dimensions.iter().map(|d| d.as_str().to_string()).collect(),
        measures: MEASURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        timezone: self.tz_name.clone(),
        source_file_count,
        build_time_secs,
        row_count,
      };
      let cube = Cube { meta, rows };
      cube.check_invariants().map_err(IngestError::BuildInvariant)?;
      cubes.push(cube);
    }
    Ok(cubes)
  }

  pub fn rows_seen(&self) -> u64 {
    self.rows_seen
  }
}

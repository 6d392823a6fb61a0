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

//! The cube algebra (§3.2): the partial-aggregate row every cube stores per
//! group, and the associative/commutative combine rules that let a coarser
//! cube answer a query by re-aggregating its stored partials.

use crate::event::DimValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `P` from §3.2: the minimum additive state sufficient to compute
/// SUM/AVG/COUNT/MIN/MAX exactly under SQL-NULL semantics (§4.8).
///
/// `bid_min`/`bid_max` are stored as plain `f64`, seeded at `+inf`/`-inf` so
/// the combine rules (§4.3) are a bare `f64::min`/`f64::max` with no `Option`
/// unwrapping on the hot path; `bid_cnt == 0` is what makes a group's min/max
/// NULL, not the sentinel value itself — see `finalize_min`/`finalize_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Partials {
  pub bid_sum: f64,
  pub bid_cnt: u64,
  pub bid_min: f64,
  pub bid_max: f64,
  pub tot_sum: f64,
  pub tot_cnt: u64,
  pub tot_min: f64,
  pub tot_max: f64,
  pub row_cnt: u64,
}

impl Default for Partials {
  fn default() -> Self {
    Self {
      bid_sum: 0.0,
      bid_cnt: 0,
      bid_min: f64::INFINITY,
      bid_max: f64::NEG_INFINITY,
      tot_sum: 0.0,
      tot_cnt: 0,
      tot_min: f64::INFINITY,
      tot_max: f64::NEG_INFINITY,
      row_cnt: 0,
    }
  }
}

impl Partials {
  /// Fold one raw event's measures into a fresh accumulator (the base case
  /// of the fold in §4.3: a single-row "batch" combined with the identity).
  pub fn from_measures(bid_price: Option<f64>, total_price: Option<f64>) -> Self {
    let mut p = Self { row_cnt: 1, ..Default::default() };
    if let Some(v) = bid_price {
      p.bid_sum = v;
      p.bid_cnt = 1;
      p.bid_min = v;
      p.bid_max = v;
    }
    if let Some(v) = total_price {
      p.tot_sum = v;
      p.tot_cnt = 1;
      p.tot_min = v;
      p.tot_max = v;
    }
    p
  }

  /// The associative, commutative combine rule from §4.3: pairwise sum for
  /// `*_sum`/`*_cnt`/`row_cnt`, pairwise min/max for `*_min`/`*_max` treating
  /// a missing side as +inf/-inf. This is the operation both the builder's
  /// fold step (C3) and the executor's regroup step (C8 Step 2) use, so a
  /// coarser cube's partials are always reachable from a finer cube's (§8 #3).
  pub fn combine(a: &Partials, b: &Partials) -> Partials {
    Partials {
      bid_sum: a.bid_sum + b.bid_sum,
      bid_cnt: a.bid_cnt + b.bid_cnt,
      bid_min: a.bid_min.min(b.bid_min),
      bid_max: a.bid_max.max(b.bid_max),
      tot_sum: a.tot_sum + b.tot_sum,
      tot_cnt: a.tot_cnt + b.tot_cnt,
      tot_min: a.tot_min.min(b.tot_min),
      tot_max: a.tot_max.max(b.tot_max),
      row_cnt: a.row_cnt + b.row_cnt,
    }
  }

  pub fn combine_in_place(&mut self, other: &Partials) {
    *self = Partials::combine(self, other);
  }

  /// `bid_min` if `bid_cnt > 0` else `NULL` (§4.3, §4.8 Step 3).
  pub fn bid_min(&self) -> Option<f64> {
    (self.bid_cnt > 0).then_some(self.bid_min)
  }

  pub fn bid_max(&self) -> Option<f64> {
    (self.bid_cnt > 0).then_some(self.bid_max)
  }

  pub fn tot_min(&self) -> Option<f64> {
    (self.tot_cnt > 0).then_some(self.tot_min)
  }

  pub fn tot_max(&self) -> Option<f64> {
    (self.tot_cnt > 0).then_some(self.tot_max)
  }

  /// `SUM` if `cnt > 0` else `NULL` (§4.8 Step 3): `bid_sum = 0` iff
  /// `bid_cnt = 0` per §3.2, but the *output* is still NULL, not zero.
  pub fn bid_sum_or_null(&self) -> Option<f64> {
    (self.bid_cnt > 0).then_some(self.bid_sum)
  }

  pub fn tot_sum_or_null(&self) -> Option<f64> {
    (self.tot_cnt > 0).then_some(self.tot_sum)
  }

  pub fn bid_avg(&self) -> Option<f64> {
    (self.bid_cnt > 0).then_some(self.bid_sum / self.bid_cnt as f64)
  }

  pub fn tot_avg(&self) -> Option<f64> {
    (self.tot_cnt > 0).then_some(self.tot_sum / self.tot_cnt as f64)
  }
}

/// A cube keyed on an ordered tuple of `DimValue`s. Built once in prepare,
/// read-only thereafter (§3.3 "Lifecycle").
#[derive(Debug, Clone)]
pub struct Cube {
  pub meta: CubeMeta,
  pub rows: HashMap<Vec<DimValue>, Partials>,
}

impl Cube {
  pub fn new(meta: CubeMeta) -> Self {
    Self { meta, rows: HashMap::new() }
  }

  /// Invariants 1 & 2 from §8: `bid_cnt`/`tot_cnt` never exceed `row_cnt`,
  /// and min <= max whenever the count is positive.
  pub fn check_invariants(&self) -> Result<(), String> {
    for (key, p) in &self.rows {
      if p.bid_cnt > p.row_cnt {
        return Err(format!("bid_cnt {} exceeds row_cnt {} for key {:?}", p.bid_cnt, p.row_cnt, key));
      }
      if p.tot_cnt > p.row_cnt {
        return Err(format!("tot_cnt {} exceeds row_cnt {} for key {:?}", p.tot_cnt, p.row_cnt, key));
      }
      if p.bid_cnt > 0 && p.bid_min > p.bid_max {
        return Err(format!("bid_min > bid_max for key {:?}", key));
      }
      if p.tot_cnt > 0 && p.tot_min > p.tot_max {
        return Err(format!("tot_min > tot_max for key {:?}", key));
      }
    }
    Ok(())
  }
}

/// Sidecar metadata persisted alongside every cube file (§4.4, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubeMeta {
  pub name: String,
  pub dimensions: Vec<String>,
  pub measures: Vec<String>,
  pub timezone: String,
  pub source_file_count: usize,
  pub build_time_secs: f64,
  pub row_count: u64,
}

pub const MEASURE_COLUMNS: [&str; 9] =
  ["bid_sum", "bid_cnt", "bid_min", "bid_max", "tot_sum", "tot_cnt", "tot_min", "tot_max", "row_cnt"];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_partials_default_is_additive_identity() {
    let identity = Partials::default();
    let p = Partials::from_measures(Some(1.5), Some(2.5));
    let combined = Partials::combine(&identity, &p);
    assert_eq!(combined.bid_sum, p.bid_sum);
    assert_eq!(combined.row_cnt, p.row_cnt);
  }

  #[test]
  fn test_all_null_measure_group() {
    let p = Partials::from_measures(None, None);
    assert_eq!(p.bid_sum_or_null(), None);
    assert_eq!(p.bid_avg(), None);
    assert_eq!(p.bid_min(), None);
    assert_eq!(p.bid_max(), None);
    assert_eq!(p.bid_cnt, 0);
    assert_eq!(p.row_cnt, 1);
  }

  #[test]
  fn test_partially_null_measure_group() {
    let a = Partials::from_measures(Some(10.0), None);
    let b = Partials::from_measures(None, None);
    let c = Partials::from_measures(Some(20.0), None);
    let mut acc = Partials::default();
    acc.combine_in_place(&a);
    acc.combine_in_place(&b);
    acc.combine_in_place(&c);
    assert_eq!(acc.bid_sum_or_null(), Some(30.0));
    assert_eq!(acc.bid_avg(), Some(15.0));
    assert_eq!(acc.bid_cnt, 2);
    assert_eq!(acc.row_cnt, 3);
  }

  #[test]
  fn test_combine_is_commutative() {
    let a = Partials::from_measures(Some(5.0), Some(1.0));
    let b = Partials::from_measures(Some(7.0), None);
    assert_eq!(Partials::combine(&a, &b), Partials::combine(&b, &a));
  }

  #[test]
  fn test_combine_is_associative() {
    let a = Partials::from_measures(Some(1.0), None);
    let b = Partials::from_measures(Some(2.0), None);
    let c = Partials::from_measures(Some(3.0), None);
    let left = Partials::combine(&Partials::combine(&a, &b), &c);
    let right = Partials::combine(&a, &Partials::combine(&b, &c));
    assert_eq!(left, right);
  }

  #[test]
  fn test_min_max_combine_treats_missing_as_infinity() {
    let a = Partials::from_measures(Some(3.0), None);
    let identity = Partials::default();
    let combined = Partials::combine(&a, &identity);
    assert_eq!(combined.bid_min(), Some(3.0));
    assert_eq!(combined.bid_max(), Some(3.0));
  }

  #[test]
  fn test_bid_cnt_never_exceeds_row_cnt() {
    let cube = {
      let mut c = Cube::new(CubeMeta {
        name: "day_type".into(),
        dimensions: vec!["day".into(), "type".into()],
        measures: MEASURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        timezone: "UTC".into(),
        source_file_count: 1,
        build_time_secs: 0.1,
        row_count: 1,
      });
      c.rows.insert(
        vec![DimValue::Str("2024-06-01".into()), DimValue::Str("click".into())],
        Partials::from_measures(None, None),
      );
      c
    };
    assert!(cube.check_invariants().is_ok());
  }

  #[test]
  fn test_check_invariants_catches_bid_cnt_overflow() {
    let mut cube = Cube::new(CubeMeta {
      name: "bad".into(),
      dimensions: vec!["day".into()],
      measures: vec![],
      timezone: "UTC".into(),
      source_file_count: 1,
      build_time_secs: 0.0,
      row_count: 0,
    });
    let mut bad = Partials::default();
    bad.bid_cnt = 5;
    bad.row_cnt = 2;
    cube.rows.insert(vec![DimValue::Str("x".into())], bad);
    assert!(cube.check_invariants().is_err());
  }
}

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

//! The router (C7, §4.7): a pure, cheap function from a query pattern to
//! the minimum-cost cube that can answer it, or to the fallback.
//!
//! Row-count estimates come from each cube's sidecar metadata (a build
//! artifact, `CubeStore::meta`) rather than a hand-maintained constant table
//! — the `ROLLUP_CATALOG` dict in `original_source/src/core/query_router.py`
//! hard-codes row counts observed on one fixed dataset; this implementation
//! reads the corresponding count from the metadata every cube build writes,
//! so the router stays correct across rebuilds with different cardinalities.

use cube_core::event::Dimension;
use cube_core::pattern::QueryPattern;
use cube_store::CubeStore;
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
  Cube(String),
  Fallback,
}

/// Dimensions recoverable from a finer one by a structural prefix operation
/// (§4.7 "Derivable columns"): `day` from `hour` or `minute`; `hour` from
/// `minute`. `week` is never derivable — different calendar basis (§4.7).
fn derivable_sources(col: Dimension) -> &'static [Dimension] {
  match col {
    Dimension::Day => &[Dimension::Hour, Dimension::Minute],
    Dimension::Hour => &[Dimension::Minute],
    _ => &[],
  }
}

fn is_derivable(col: Dimension) -> bool {
  !derivable_sources(col).is_empty()
}

/// Routes `pattern` to the cheapest cube that can answer it exactly, or to
/// the fallback if none can (§4.7 Selection steps 1-4).
pub fn route(pattern: &QueryPattern, store: &CubeStore) -> RouteDecision {
  let group_by: Vec<Dimension> = pattern
    .group_by
    .iter()
    .filter_map(|c| Dimension::from_str(c).ok())
    .collect();
  if group_by.len() != pattern.group_by.len() {
    // A group_by column outside the closed dimension vocabulary can never
    // be answered by any cube.
    debug!("group_by references a column outside the closed dimension set, routing to fallback");
    return RouteDecision::Fallback;
  }

  let filter_cols: Vec<Dimension> = pattern
    .filters
    .iter()
    .filter_map(|f| Dimension::from_str(&f.col).ok())
    .collect();
  if filter_cols.len() != pattern.filters.len() {
    debug!("filter references a column outside the closed dimension set, routing to fallback");
    return RouteDecision::Fallback;
  }

  let group_by_set: BTreeSet<Dimension> = group_by.iter().copied().collect();
  let derivable_filter_cols: BTreeSet<Dimension> =
    filter_cols.iter().copied().filter(|c| is_derivable(*c)).collect();
  let non_derivable_filter_cols: BTreeSet<Dimension> =
    filter_cols.iter().copied().filter(|c| !is_derivable(*c)).collect();

  let must_have: BTreeSet<Dimension> = group_by_set.union(&non_derivable_filter_cols).copied().collect();

  debug!(
    ?must_have,
    ?derivable_filter_cols,
    "routing query pattern"
  );

  let mut candidates: Vec<(&'static str, u64)> = Vec::new();
  for spec in cube_core::CUBE_FAMILY {
    let dim_set: BTreeSet<Dimension> = spec.dimensions.iter().copied().collect();
    if !must_have.is_subset(&dim_set) {
      continue;
    }
    let can_derive_all = derivable_filter_cols
      .iter()
      .all(|col| derivable_sources(*col).iter().any(|src| dim_set.contains(src)));
    if !can_derive_all {
      continue;
    }
    let Ok(meta) = store.meta(spec.name) else { continue };
    candidates.push((spec.name, meta.row_count));
  }

  if candidates.is_empty() {
    info!("no rollup matches pattern, routing to fallback");
    return RouteDecision::Fallback;
  }

  // Smallest row-count estimate wins; ties break by cube name (§4.7).
  candidates.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
  let chosen = candidates[0].0;
  info!(cube = chosen, "routed query pattern");
  RouteDecision::Cube(chosen.to_string())
}

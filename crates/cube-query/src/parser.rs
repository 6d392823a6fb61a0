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

//! The query parser (C6, §4.6): normalizes the declarative raw query JSON
//! (a `select` array mixing bare column names and `{FUNC: col}` aggregate
//! objects, a `where` list, an `order_by` list) into the closed internal
//! `QueryPattern` both execution paths consume.
//!
//! `QueryPattern` itself already implements `serde::Deserialize` for its own
//! shape (`{group_by, aggregates, filters, order_by}`) — useful for loading
//! fixtures that are already in internal form. This module is the other
//! direction: the *raw*, schema-flexible query document described in §3.4
//! and the example workload (`select`/`where`/`order_by`, `from: "events"`
//! ignored since only one table exists).

use crate::error::{QueryError, QueryResult};
use cube_core::agg::COUNT_STAR_ALIAS;
use cube_core::pattern::{Filter, OrderBy, QueryPattern};
use cube_core::{AggFn, AggRequest};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SelectItem {
  /// A bare group-by column, e.g. `"day"`.
  Column(String),
  /// `{"SUM": "bid_price"}` or `{"COUNT": "*"}` — a single-entry map since
  /// JSON object key order isn't guaranteed but every aggregate item in
  /// this grammar carries exactly one function (§4.6).
  Agg(BTreeMap<String, String>),
}

#[derive(Debug, Deserialize)]
struct RawQuery {
  select: Vec<SelectItem>,
  #[serde(rename = "where", default)]
  filters: Vec<Filter>,
  #[serde(default)]
  order_by: Vec<OrderBy>,
  #[serde(default)]
  limit: Option<u64>,
}

/// Parses one raw query JSON document into a `QueryPattern` (§4.6).
///
/// - `select` items that are bare strings become `group_by` columns, in the
///   order they appear in `select`.
/// - `select` items that are single-key objects become aggregates; the
///   function name is uppercased, and `col == "*"` is recognized only for
///   `COUNT` (the sole wildcard, §3.4).
/// - `where` entries are carried verbatim into `filters`.
/// - `order_by` is carried verbatim, except a reference to `COUNT(*)` (the
///   literal token the example workload's queries use) is rewritten to this
///   engine's single stable alias (`cube_core::COUNT_STAR_ALIAS`) so it
///   resolves against the same column both execution paths produce.
pub fn parse_query(json: &str) -> QueryResult<QueryPattern> {
  let raw: RawQuery = serde_json::from_str(json).map_err(|e| QueryError::Parse(e.to_string()))?;
  build_pattern(raw)
}

pub fn parse_query_value(value: serde_json::Value) -> QueryResult<QueryPattern> {
  let raw: RawQuery = serde_json::from_value(value).map_err(|e| QueryError::Parse(e.to_string()))?;
  build_pattern(raw)
}

fn build_pattern(raw: RawQuery) -> QueryResult<QueryPattern> {
  let mut group_by = Vec::new();
  let mut aggregates = Vec::new();

  for item in raw.select {
    match item {
      SelectItem::Column(col) => group_by.push(col),
      SelectItem::Agg(map) => {
        let (func_name, col) = map
          .into_iter()
          .next()
          .ok_or_else(|| QueryError::Parse("aggregate select item has no function".into()))?;
        let func = parse_agg_fn(&func_name)?;
        let agg = if func == AggFn::Count && col == "*" {
          AggRequest::count_star()
        } else {
          AggRequest { func, col: Some(col) }
        };
        aggregates.push(agg);
      }
    }
  }

  let order_by = raw.order_by.into_iter().map(normalize_order_by).collect();

  Ok(QueryPattern { group_by, aggregates, filters: raw.filters, order_by, limit: raw.limit })
}

fn parse_agg_fn(name: &str) -> QueryResult<AggFn> {
  match name.to_uppercase().as_str() {
    "SUM" => Ok(AggFn::Sum),
    "AVG" => Ok(AggFn::Avg),
    "COUNT" => Ok(AggFn::Count),
    "MIN" => Ok(AggFn::Min),
    "MAX" => Ok(AggFn::Max),
    other => Err(QueryError::Parse(format!("unknown aggregate function: {}", other))),
  }
}

/// `order_by: [{"col": "COUNT(*)", "dir": "desc"}]` is how the example
/// workload spells a reference to the wildcard count; every other aggregate
/// reference (`"AVG(total_price)"`, `"SUM(bid_price)"`) already matches
/// `AggRequest::alias()`'s output verbatim, so only this one token needs
/// rewriting (§9's flagged "single stable alias" open question).
fn normalize_order_by(mut ob: OrderBy) -> OrderBy {
  if ob.col.eq_ignore_ascii_case("COUNT(*)") {
    ob.col = COUNT_STAR_ALIAS.to_string();
  }
  ob
}

#[cfg(test)]
mod tests {
  use super::*;
  use cube_core::pattern::{FilterOp, FilterValue, OrderDir};

  #[test]
  fn test_bare_string_select_items_become_group_by() {
    let pattern = parse_query(r#"{"select": ["day", "type"]}"#).unwrap();
    assert_eq!(pattern.group_by, vec!["day", "type"]);
    assert!(pattern.aggregates.is_empty());
  }

  #[test]
  fn test_agg_object_becomes_aggregate_with_uppercased_func() {
    let pattern = parse_query(r#"{"select": [{"sum": "bid_price"}]}"#).unwrap();
    assert_eq!(pattern.aggregates, vec![AggRequest { func: AggFn::Sum, col: Some("bid_price".into()) }]);
  }

  #[test]
  fn test_count_star_wildcard() {
    let pattern = parse_query(r#"{"select": [{"COUNT": "*"}]}"#).unwrap();
    assert_eq!(pattern.aggregates, vec![AggRequest::count_star()]);
  }

  #[test]
  fn test_count_of_named_column_is_not_wildcard() {
    let pattern = parse_query(r#"{"select": [{"COUNT": "bid_price"}]}"#).unwrap();
    assert_eq!(pattern.aggregates[0].col.as_deref(), Some("bid_price"));
  }

  #[test]
  fn test_where_is_preserved_verbatim() {
    let pattern =
      parse_query(r#"{"select": ["day"], "where": [{"col": "type", "op": "eq", "val": "impression"}]}"#)
        .unwrap();
    assert_eq!(pattern.filters.len(), 1);
    assert_eq!(pattern.filters[0].col, "type");
    assert_eq!(pattern.filters[0].op, FilterOp::Eq);
    assert_eq!(pattern.filters[0].value, FilterValue::Str("impression".into()));
  }

  #[test]
  fn test_order_by_default_direction_is_ascending() {
    let pattern = parse_query(r#"{"select": ["day"], "order_by": [{"col": "day"}]}"#).unwrap();
    assert_eq!(pattern.order_by[0].dir, OrderDir::Asc);
  }

  #[test]
  fn test_order_by_count_star_literal_rewritten_to_stable_alias() {
    let pattern = parse_query(
      r#"{"select": ["type", {"COUNT": "*"}], "order_by": [{"col": "COUNT(*)", "dir": "desc"}]}"#,
    )
    .unwrap();
    assert_eq!(pattern.order_by[0].col, COUNT_STAR_ALIAS);
  }

  #[test]
  fn test_order_by_named_aggregate_alias_passes_through_unchanged() {
    let pattern = parse_query(
      r#"{"select": ["country", {"AVG": "total_price"}], "order_by": [{"col": "AVG(total_price)", "dir": "desc"}]}"#,
    )
    .unwrap();
    assert_eq!(pattern.order_by[0].col, "AVG(total_price)");
  }

  #[test]
  fn test_limit_is_carried_through() {
    let pattern = parse_query(r#"{"select": ["day"], "limit": 5}"#).unwrap();
    assert_eq!(pattern.limit, Some(5));
  }

  #[test]
  fn test_unknown_aggregate_function_is_parse_error() {
    let err = parse_query(r#"{"select": [{"MEDIAN": "bid_price"}]}"#).unwrap_err();
    assert!(matches!(err, QueryError::Parse(_)));
  }

  #[test]
  fn test_malformed_json_is_parse_error() {
    let err = parse_query("not json").unwrap_err();
    assert!(matches!(err, QueryError::Parse(_)));
  }

  #[test]
  fn test_multi_aggregate_query_preserves_select_order() {
    let pattern = parse_query(
      r#"{"select": ["day", {"COUNT": "*"}, {"SUM": "total_price"}]}"#,
    )
    .unwrap();
    assert_eq!(pattern.group_by, vec!["day"]);
    assert_eq!(pattern.aggregates.len(), 2);
    assert_eq!(pattern.aggregates[0], AggRequest::count_star());
    assert_eq!(pattern.aggregates[1], AggRequest { func: AggFn::Sum, col: Some("total_price".into()) });
  }
}

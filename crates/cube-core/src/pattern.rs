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

//! The internal query pattern (§3.4): the normalized form both the rollup
//! path (`cube-query`'s router and executor) and the fallback path
//! (`cube-store`'s fallback executor) consume. Kept here, rather than in
//! `cube-query`, precisely so both of those independent consumers can depend
//! on the type without depending on each other.

use crate::agg::AggRequest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
  Eq,
  Neq,
  In,
  Between,
  Gt,
  Gte,
  Lt,
  Lte,
}

/// A filter value. `serde(untagged)` lets `"US"`, `42`, `["US","JP"]`, and
/// `["2024-06-01","2024-06-30"]` all deserialize without a wrapper tag, which
/// is exactly the shape query JSON documents use (§3.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
  Str(String),
  Int(i64),
  List(Vec<FilterValue>),
}

impl FilterValue {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      FilterValue::Str(s) => Some(s),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
  pub col: String,
  pub op: FilterOp,
  /// Wire name is `val`, matching the `{col, op, val}` shape of §3.4's
  /// query pattern grammar (and the raw query JSON's `where` entries,
  /// which carry the same three fields verbatim per §4.6).
  #[serde(rename = "val")]
  pub value: FilterValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDir {
  Asc,
  Desc,
}

impl Default for OrderDir {
  /// §4.6: "default direction is ascending".
  fn default() -> Self {
    OrderDir::Asc
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
  pub col: String,
  #[serde(default)]
  pub dir: OrderDir,
}

/// The normalized query (§3.4), plus the optional `limit` field this engine
/// supplements the closed grammar with (see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QueryPattern {
  pub group_by: Vec<String>,
  pub aggregates: Vec<AggRequest>,
  pub filters: Vec<Filter>,
  pub order_by: Vec<OrderBy>,
  #[serde(default)]
  pub limit: Option<u64>,
}

impl QueryPattern {
  /// `R = group_by(Q) ∪ {filter columns of Q}` (§4.7).
  pub fn required_columns(&self) -> BTreeSet<String> {
    let mut cols: BTreeSet<String> = self.group_by.iter().cloned().collect();
    cols.extend(self.filters.iter().map(|f| f.col.clone()));
    cols
  }

  pub fn filter_columns(&self) -> BTreeSet<String> {
    self.filters.iter().map(|f| f.col.clone()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::agg::AggFn;

  #[test]
  fn test_filter_value_deserializes_untagged() {
    let scalar: FilterValue = serde_json::from_str("\"US\"").unwrap();
    assert_eq!(scalar, FilterValue::Str("US".into()));
    let int: FilterValue = serde_json::from_str("42").unwrap();
    assert_eq!(int, FilterValue::Int(42));
    let list: FilterValue = serde_json::from_str("[\"US\",\"JP\"]").unwrap();
    assert_eq!(list, FilterValue::List(vec![FilterValue::Str("US".into()), FilterValue::Str("JP".into())]));
  }

  #[test]
  fn test_order_dir_defaults_to_ascending() {
    let ob: OrderBy = serde_json::from_str(r#"{"col":"day"}"#).unwrap();
    assert_eq!(ob.dir, OrderDir::Asc);
  }

  #[test]
  fn test_required_columns_unions_group_by_and_filters() {
    let pattern = QueryPattern {
      group_by: vec!["day".into(), "type".into()],
      aggregates: vec![AggRequest { func: AggFn::Sum, col: Some("bid_price".into()) }],
      filters: vec![Filter { col: "country".into(), op: FilterOp::Eq, value: FilterValue::Str("US".into()) }],
      order_by: vec![],
      limit: None,
    };
    let required = pattern.required_columns();
    assert!(required.contains("day"));
    assert!(required.contains("type"));
    assert!(required.contains("country"));
    assert_eq!(required.len(), 3);
  }

  #[test]
  fn test_limit_defaults_to_none_when_absent() {
    let pattern: QueryPattern =
      serde_json::from_str(r#"{"group_by":[],"aggregates":[],"filters":[],"order_by":[]}"#).unwrap();
    assert_eq!(pattern.limit, None);
  }

  #[test]
  fn test_limit_parses_when_present() {
    let pattern: QueryPattern = serde_json::from_str(
      r#"{"group_by":[],"aggregates":[],"filters":[],"order_by":[],"limit":10}"#,
    )
    .unwrap();
    assert_eq!(pattern.limit, Some(10));
  }
}

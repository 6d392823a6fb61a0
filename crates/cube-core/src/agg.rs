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

//! The closed set of query aggregate functions (§3.4) and the canonical
//! column-alias naming shared by the rollup executor (C8) and the fallback
//! executor (C9), so `order_by` resolves identically regardless of which
//! engine answered a query.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggFn {
  Sum,
  Avg,
  Count,
  Min,
  Max,
}

impl AggFn {
  pub fn as_str(&self) -> &'static str {
    match self {
      AggFn::Sum => "SUM",
      AggFn::Avg => "AVG",
      AggFn::Count => "COUNT",
      AggFn::Min => "MIN",
      AggFn::Max => "MAX",
    }
  }
}

impl fmt::Display for AggFn {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// The single stable alias `COUNT(*)` maps to in output column names and in
/// `ORDER BY` references, resolving spec.md §9's second flagged open question
/// (the original source's rollup path used `count_star()` while its fallback
/// path used the literal `COUNT(*)`). Chosen here as a single bare identifier
/// so it round-trips through the fallback engine's `ORDER BY` clause without
/// quoting; see DESIGN.md.
pub const COUNT_STAR_ALIAS: &str = "count_star";

/// One `{fn, col}` aggregate request (§3.4). `col` is `None` only for
/// `COUNT(*)` (the sole wildcard, per §3.4 and §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggRequest {
  pub func: AggFn,
  pub col: Option<String>,
}

impl AggRequest {
  pub fn count_star() -> Self {
    Self { func: AggFn::Count, col: None }
  }

  /// The canonical output column alias: `SUM(bid_price)`, `AVG(total_price)`,
  /// `COUNT(total_price)`, or the stable `count_star` token for `COUNT(*)`
  /// (§4.8 Step 4).
  pub fn alias(&self) -> String {
    match (&self.func, &self.col) {
      (AggFn::Count, None) => COUNT_STAR_ALIAS.to_string(),
      (func, Some(col)) => format!("{}({})", func.as_str(), col),
      (func, None) => format!("{}(*)", func.as_str()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_alias_sum() {
    let r = AggRequest { func: AggFn::Sum, col: Some("bid_price".into()) };
    assert_eq!(r.alias(), "SUM(bid_price)");
  }

  #[test]
  fn test_alias_avg() {
    let r = AggRequest { func: AggFn::Avg, col: Some("total_price".into()) };
    assert_eq!(r.alias(), "AVG(total_price)");
  }

  #[test]
  fn test_alias_count_star_is_stable_token() {
    assert_eq!(AggRequest::count_star().alias(), "count_star");
  }

  #[test]
  fn test_alias_count_col() {
    let r = AggRequest { func: AggFn::Count, col: Some("bid_price".into()) };
    assert_eq!(r.alias(), "COUNT(bid_price)");
  }

  #[test]
  fn test_display_matches_sql_keyword() {
    assert_eq!(AggFn::Min.to_string(), "MIN");
    assert_eq!(AggFn::Max.to_string(), "MAX");
  }
}

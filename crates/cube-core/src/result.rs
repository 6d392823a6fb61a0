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

//! The shaped query result (§4.8 Step 5): columns in `group_by ++
//! aggregates` order, rows in whatever order the executor produced. Shared
//! by both execution paths (the rollup executor in `cube-query` and the
//! fallback executor in `cube-store`) so oracle-equivalence checks (§8
//! property 9) compare like with like.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputValue {
  Str(String),
  Int(i64),
  Float(f64),
  Null,
}

impl fmt::Display for OutputValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OutputValue::Str(s) => write!(f, "{}", s),
      OutputValue::Int(i) => write!(f, "{}", i),
      OutputValue::Float(v) => write!(f, "{}", v),
      OutputValue::Null => write!(f, ""),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QueryResult {
  pub columns: Vec<String>,
  pub rows: Vec<Vec<OutputValue>>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_null_displays_empty_for_csv_emission() {
    assert_eq!(OutputValue::Null.to_string(), "");
  }

  #[test]
  fn test_float_display() {
    assert_eq!(OutputValue::Float(1.5).to_string(), "1.5");
  }

  #[test]
  fn test_query_result_default_is_empty() {
    let result = QueryResult::default();
    assert!(result.columns.is_empty());
    assert!(result.rows.is_empty());
  }
}

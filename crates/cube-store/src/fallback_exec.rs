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

//! The fallback executor (C9, §4.5): translates a `QueryPattern` into SQL
//! against the clustered `events` table and runs it through DuckDB's own
//! (synchronous, internally multi-threaded) query engine. No cube is
//! consulted here — this is the oracle path the router falls back to when
//! no cube in the family can answer a query, and the path integration tests
//! compare the rollup path against (§8 property 9).

use crate::error::{FallbackError, FallbackResult};
use cube_core::pattern::{Filter, FilterOp, FilterValue, QueryPattern};
use cube_core::{AggFn, Dimension, OutputValue, QueryResult};
use duckdb::types::Value;
use duckdb::Connection;
use std::fmt::Write as _;
use std::str::FromStr;

pub struct FallbackExecutor<'a> {
  conn: &'a Connection,
}

impl<'a> FallbackExecutor<'a> {
  pub fn new(conn: &'a Connection) -> Self {
    Self { conn }
  }

  pub fn execute(&self, pattern: &QueryPattern) -> FallbackResult<QueryResult> {
    let sql = build_sql(pattern)?;
    let mut stmt = self.conn.prepare(&sql)?;
    let column_count = stmt.column_count();
    let columns = pattern_columns(pattern);

    let mut rows_out = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
      let mut out_row = Vec::with_capacity(column_count);
      for i in 0..column_count {
        let value: Value = row.get(i)?;
        out_row.push(value_to_output(value));
      }
      rows_out.push(out_row);
    }
    Ok(QueryResult { columns, rows: rows_out })
  }
}

fn pattern_columns(pattern: &QueryPattern) -> Vec<String> {
  let mut cols: Vec<String> = pattern.group_by.clone();
  cols.extend(pattern.aggregates.iter().map(|a| a.alias()));
  cols
}

/// Builds the `SELECT ... FROM events ...` statement for one pattern
/// (§4.5). Identifiers come from the closed dimension/measure vocabulary
/// (never user-supplied free text), so they're interpolated directly;
/// filter values are escaped before interpolation since DuckDB's Rust
/// binder doesn't support parameterizing column lists or `IN (...)` with a
/// dynamic arity cleanly for this shape.
fn build_sql(pattern: &QueryPattern) -> FallbackResult<String> {
  let mut select_parts: Vec<String> = pattern.group_by.clone();
  for agg in &pattern.aggregates {
    let expr = match (&agg.func, &agg.col) {
      (AggFn::Count, None) => "COUNT(*)".to_string(),
      (func, Some(col)) => format!("{}({})", func.as_str(), col),
      (func, None) => format!("{}(*)", func.as_str()),
    };
    select_parts.push(format!("{} AS \"{}\"", expr, agg.alias()));
  }
  if select_parts.is_empty() {
    select_parts.push("COUNT(*) AS \"count_star\"".to_string());
  }

  let mut sql = String::new();
  write!(sql, "SELECT {} FROM events", select_parts.join(", ")).unwrap();

  if !pattern.filters.is_empty() {
    let mut clauses = Vec::with_capacity(pattern.filters.len());
    for filter in &pattern.filters {
      clauses.push(render_filter(filter)?);
    }
    write!(sql, " WHERE {}", clauses.join(" AND ")).unwrap();
  }

  if !pattern.group_by.is_empty() {
    write!(sql, " GROUP BY {}", pattern.group_by.join(", ")).unwrap();
  }

  if !pattern.order_by.is_empty() {
    let parts: Vec<String> = pattern
      .order_by
      .iter()
      .map(|o| format!("\"{}\" {}", o.col, if o.dir == cube_core::pattern::OrderDir::Desc { "DESC" } else { "ASC" }))
      .collect();
    write!(sql, " ORDER BY {}", parts.join(", ")).unwrap();
  }

  if let Some(limit) = pattern.limit {
    write!(sql, " LIMIT {}", limit).unwrap();
  }

  Ok(sql)
}

/// `col` is either a dimension (quoted as a string literal) or a measure
/// (numeric, unquoted); §4.5's rule for telling them apart is exactly
/// `Dimension::is_string_typed`.
fn render_filter(filter: &Filter) -> FallbackResult<String> {
  let string_typed = Dimension::from_str(&filter.col).map(|d| d.is_string_typed()).unwrap_or(false);
  match filter.op {
    FilterOp::Eq => Ok(format!("{} = {}", filter.col, render_scalar(&filter.value, string_typed))),
    FilterOp::Neq => Ok(format!("{} != {}", filter.col, render_scalar(&filter.value, string_typed))),
    FilterOp::Gt => Ok(format!("{} > {}", filter.col, render_scalar(&filter.value, string_typed))),
    FilterOp::Gte => Ok(format!("{} >= {}", filter.col, render_scalar(&filter.value, string_typed))),
    FilterOp::Lt => Ok(format!("{} < {}", filter.col, render_scalar(&filter.value, string_typed))),
    FilterOp::Lte => Ok(format!("{} <= {}", filter.col, render_scalar(&filter.value, string_typed))),
    FilterOp::In => match &filter.value {
      FilterValue::List(items) => {
        let rendered: Vec<String> = items.iter().map(|v| render_scalar(v, string_typed)).collect();
        Ok(format!("{} IN ({})", filter.col, rendered.join(", ")))
      }
      _ => Err(FallbackError::UnsupportedFilter { col: filter.col.clone(), op: filter.op }),
    },
    FilterOp::Between => match &filter.value {
      FilterValue::List(items) if items.len() == 2 => Ok(format!(
        "{} BETWEEN {} AND {}",
        filter.col,
        render_scalar(&items[0], string_typed),
        render_scalar(&items[1], string_typed)
      )),
      _ => Err(FallbackError::UnsupportedFilter { col: filter.col.clone(), op: filter.op }),
    },
  }
}

fn render_scalar(value: &FilterValue, string_typed: bool) -> String {
  match value {
    FilterValue::Str(s) => format!("'{}'", s.replace('\'', "''")),
    FilterValue::Int(i) => {
      if string_typed {
        format!("'{}'", i)
      } else {
        i.to_string()
      }
    }
    FilterValue::List(_) => String::from("NULL"),
  }
}

/// DuckDB's dynamic `Value` collapses onto the three shapes the output
/// schema actually carries (§4.8 Step 5): text, number, or null. Anything
/// this engine's schema never produces (blobs, structs, ...) falls back to
/// its debug text rather than failing the query.
fn value_to_output(v: Value) -> OutputValue {
  match v {
    Value::Null => OutputValue::Null,
    Value::TinyInt(i) => OutputValue::Int(i as i64),
    Value::SmallInt(i) => OutputValue::Int(i as i64),
    Value::Int(i) => OutputValue::Int(i as i64),
    Value::BigInt(i) => OutputValue::Int(i),
    Value::UTinyInt(i) => OutputValue::Int(i as i64),
    Value::USmallInt(i) => OutputValue::Int(i as i64),
    Value::UInt(i) => OutputValue::Int(i as i64),
    Value::UBigInt(i) => OutputValue::Int(i as i64),
    Value::Float(f) => OutputValue::Float(f as f64),
    Value::Double(f) => OutputValue::Float(f),
    Value::Text(s) => OutputValue::Str(s),
    Value::Boolean(b) => OutputValue::Int(b as i64),
    other => OutputValue::Str(format!("{:?}", other)),
  }
}

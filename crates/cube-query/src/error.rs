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

use thiserror::Error;

/// §7's `RouteError`/`ExecError`, plus a parse-time error for malformed raw
/// query JSON. All three are per-query: the run loop records the failure
/// against the query's index and moves on (§7 "Propagation policy").
#[derive(Error, Debug)]
pub enum QueryError {
  #[error("malformed query JSON: {0}")]
  Parse(String),

  #[error("no rollup matches query and fallback is unavailable")]
  NoRoute,

  #[error("column '{0}' is not present in cube '{1}' and cannot be derived")]
  UnknownColumn(String, String),

  #[error("unsupported aggregate {func:?}({col:?}) for this executor")]
  UnsupportedAggregate { func: cube_core::AggFn, col: Option<String> },

  #[error("store error: {0}")]
  Store(#[from] cube_store::StoreError),

  #[error("fallback error: {0}")]
  Fallback(#[from] cube_store::FallbackError),
}

pub type QueryResult<T> = Result<T, QueryError>;

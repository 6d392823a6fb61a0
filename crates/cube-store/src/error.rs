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

/// Cube-file and fallback-store errors (§7's `StoreError`): fatal at run
/// start, since a missing or corrupt cube or a timezone disagreement leaves
/// the run phase unable to guarantee cross-engine agreement.
#[derive(Error, Debug)]
pub enum StoreError {
  #[error("cube file not found: {0}")]
  NotFound(String),

  #[error("I/O error on {path}: {source}")]
  Io { path: String, #[source] source: std::io::Error },

  #[error("corrupt cube file {path}: {reason}")]
  Corrupt { path: String, reason: String },

  #[error("metadata decode error for {path}: {source}")]
  Meta { path: String, #[source] source: serde_json::Error },

  #[error("cube {cube} was built with timezone {cube_tz}, run phase is pinned to {run_tz}")]
  TimezoneMismatch { cube: String, cube_tz: String, run_tz: String },

  #[error("arrow error: {0}")]
  Arrow(#[from] arrow::error::ArrowError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fallback-executor errors (§7's `FallbackError`): per-query, never fatal
/// to the run loop.
#[derive(Error, Debug)]
pub enum FallbackError {
  #[error("duckdb error: {0}")]
  DuckDb(#[from] duckdb::Error),

  #[error("unsupported filter operator {op:?} on column {col}")]
  UnsupportedFilter { col: String, op: cube_core::pattern::FilterOp },
}

pub type FallbackResult<T> = Result<T, FallbackError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_not_found_display() {
    let err = StoreError::NotFound("day_type".into());
    assert_eq!(err.to_string(), "cube file not found: day_type");
  }

  #[test]
  fn test_timezone_mismatch_display() {
    let err = StoreError::TimezoneMismatch {
      cube: "day_type".into(),
      cube_tz: "UTC".into(),
      run_tz: "America/New_York".into(),
    };
    assert!(err.to_string().contains("UTC"));
    assert!(err.to_string().contains("America/New_York"));
  }

  #[test]
  fn test_corrupt_display() {
    let err = StoreError::Corrupt { path: "day_type.arrow".into(), reason: "truncated".into() };
    assert_eq!(err.to_string(), "corrupt cube file day_type.arrow: truncated");
  }
}

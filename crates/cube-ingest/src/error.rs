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

/// Ingestion errors are fatal to the prepare phase (§4.3's failure model: no
/// partial cubes are ever emitted). There is no retry path — a bad batch
/// aborts the whole build.
#[derive(Error, Debug)]
pub enum IngestError {
  #[error("CSV error reading {path}: {source}")]
  Csv { path: String, #[source] source: csv::Error },

  #[error("I/O error reading {path}: {source}")]
  Io { path: String, #[source] source: std::io::Error },

  #[error("glob pattern error: {0}")]
  Glob(#[from] glob::PatternError),

  #[error("glob iteration error: {0}")]
  GlobIter(#[from] glob::GlobError),

  #[error("malformed event row in {path} at line {line}: {reason}")]
  MalformedRow { path: String, line: u64, reason: String },

  #[error("time encoding error: {0}")]
  Time(#[from] cube_core::Error),

  #[error("fold invariant violated: {0}")]
  BuildInvariant(String),

  #[error("no input files matched pattern {0}")]
  NoInputFiles(String),
}

pub type IngestResult<T> = Result<T, IngestError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_malformed_row_display() {
    let err =
      IngestError::MalformedRow { path: "events.csv".into(), line: 42, reason: "bad ts".into() };
    assert_eq!(err.to_string(), "malformed event row in events.csv at line 42: bad ts");
  }

  #[test]
  fn test_no_input_files_display() {
    let err = IngestError::NoInputFiles("data/*.csv".into());
    assert_eq!(err.to_string(), "no input files matched pattern data/*.csv");
  }

  #[test]
  fn test_build_invariant_display() {
    let err = IngestError::BuildInvariant("duplicate key after coalesce".into());
    assert_eq!(err.to_string(), "fold invariant violated: duplicate key after coalesce");
  }

  #[test]
  fn test_time_error_from_cube_core() {
    let core_err = cube_core::Error::TimeDecode(i64::MAX, "UTC".into());
    let err = IngestError::from(core_err);
    assert!(matches!(err, IngestError::Time(_)));
  }

  #[test]
  fn test_ingest_result_ok() {
    let result: IngestResult<i32> = Ok(7);
    assert_eq!(result.unwrap(), 7);
  }
}

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

//! Input file discovery (§6 "Input event files"): a directory of CSVs,
//! discovered by glob and sorted by path. Order does not affect the final
//! cubes (the builder's fold is commutative in the batch dimension), but a
//! stable order makes `source_file_count`/progress logging reproducible.

use crate::error::{IngestError, IngestResult};
use std::path::PathBuf;

pub fn discover_csv_files(dir: &str) -> IngestResult<Vec<PathBuf>> {
  let pattern = format!("{}/**/*.csv", dir.trim_end_matches('/'));
  let mut paths = Vec::new();
  for entry in glob::glob(&pattern)? {
    paths.push(entry?);
  }
  paths.sort();
  if paths.is_empty() {
    return Err(IngestError::NoInputFiles(pattern));
  }
  Ok(paths)
}

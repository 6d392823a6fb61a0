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

use std::env;
use std::path::PathBuf;

/// Optional thread-count hint for the builder's rayon pool (§6 "Environment
/// variables"). Honored only if set; otherwise rayon keeps its own default.
pub fn build_threads_from_env() -> Option<usize> {
  env::var("CUBE_BUILD_THREADS").ok().and_then(|v| v.parse::<usize>().ok())
}

/// Resolved configuration for `cube-cli prepare`, assembled from CLI flags
/// in `commands::prepare`.
#[derive(Debug, Clone)]
pub struct PrepareConfig {
  pub data_dir: String,
  pub rollup_dir: PathBuf,
  pub fallback_path: PathBuf,
  pub timezone: String,
  pub fold_threshold: usize,
  pub batch_rows: usize,
}

/// Resolved configuration for `cube-cli run`, assembled from CLI flags in
/// `commands::run`.
#[derive(Debug, Clone)]
pub struct RunConfig {
  pub rollup_dir: PathBuf,
  pub fallback_path: PathBuf,
  pub query_file: Option<PathBuf>,
  pub query_dir: Option<PathBuf>,
  pub output_dir: PathBuf,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_build_threads_from_env_parses_integer() {
    env::set_var("CUBE_BUILD_THREADS", "4");
    assert_eq!(build_threads_from_env(), Some(4));
    env::remove_var("CUBE_BUILD_THREADS");
  }

  #[test]
  fn test_build_threads_from_env_ignores_garbage() {
    env::set_var("CUBE_BUILD_THREADS", "not-a-number");
    assert_eq!(build_threads_from_env(), None);
    env::remove_var("CUBE_BUILD_THREADS");
  }

  #[test]
  fn test_build_threads_from_env_absent_is_none() {
    env::remove_var("CUBE_BUILD_THREADS");
    assert_eq!(build_threads_from_env(), None);
  }
}

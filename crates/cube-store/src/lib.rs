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

//! # cube-store
//!
//! Two persistence concerns for the auction-event cube engine:
//!
//! - **C4**: columnar cube files — Arrow IPC with LZ4 frame compression, one
//!   file per cube in the family, mmap-loaded and cached in memory for the
//!   life of the run phase (`cube_file`).
//! - **C5/C9**: an embedded DuckDB database holding the raw, unaggregated
//!   events, physically clustered for the router's fallback path, plus the
//!   executor that turns a query pattern into SQL against it
//!   (`fallback_store`, `fallback_exec`).

pub mod cube_file;
pub mod error;
pub mod fallback_exec;
pub mod fallback_store;

pub use cube_file::CubeStore;
pub use error::{FallbackError, FallbackResult, StoreError, StoreResult};
pub use fallback_exec::FallbackExecutor;
pub use fallback_store::{open_read_only, read_fallback_timezone, FallbackStoreBuilder};

pub mod prelude {
  pub use crate::cube_file::CubeStore;
  pub use crate::error::{FallbackError, FallbackResult, StoreError, StoreResult};
  pub use crate::fallback_exec::FallbackExecutor;
  pub use crate::fallback_store::{open_read_only, read_fallback_timezone, FallbackStoreBuilder};
}

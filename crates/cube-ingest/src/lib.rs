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

//! # cube-ingest
//!
//! The prepare phase's input side: discovers input CSV files, streams them
//! as bounded batches (C2), and folds those batches into the closed cube
//! family under a bounded memory ceiling (C3).
//!
//! Nothing here reaches back into `cube-store` or `cube-query` — this crate
//! produces `cube_core::Cube` values and a `ProcessTracker` history, and
//! hands both to its caller.

pub mod batch;
pub mod builder;
pub mod discovery;
pub mod error;
pub mod event_csv;
pub mod process_tracker;

pub use batch::{EventBatch, Ingestor, DEFAULT_BATCH_SIZE};
pub use builder::{CubeBuilder, FOLD_THRESHOLD};
pub use discovery::discover_csv_files;
pub use error::{IngestError, IngestResult};
pub use event_csv::read_events;
pub use process_tracker::{ProcessInfo, ProcessState, ProcessTracker};

pub mod prelude {
  pub use crate::{
    discover_csv_files, read_events, CubeBuilder, EventBatch, IngestError, IngestResult, Ingestor,
    ProcessState, ProcessTracker, DEFAULT_BATCH_SIZE, FOLD_THRESHOLD,
  };
}

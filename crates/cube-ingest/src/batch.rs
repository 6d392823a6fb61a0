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

//! The streaming ingestor (C2, §4.2): a lazy, finite sequence of bounded-size
//! batches pulled from the discovered input files. A batch carries the event
//! schema plus the four derived time columns, computed once per batch.
//!
//! Realized here as a plain pull `Iterator` rather than an async stream or a
//! generator — the builder (C3) only ever calls `next()` in a loop, so that
//! is the whole of the contract §4.2 asks for.

use crate::discovery::discover_csv_files;
use crate::error::{IngestError, IngestResult};
use crate::event_csv::read_events;
use chrono_tz::Tz;
use cube_core::time::{encode_all, DerivedTime};
use cube_core::Event;
use std::collections::VecDeque;
use std::path::PathBuf;

/// `B`, tuned so one batch's working set stays comfortably below the memory
/// budget (§4.2). 2^20 rows of the event schema is on the order of tens of
/// megabytes, not hundreds.
pub const DEFAULT_BATCH_SIZE: usize = 1 << 20;

/// One batch: the raw events plus their derived time columns, index-aligned.
#[derive(Debug, Clone)]
pub struct EventBatch {
  pub events: Vec<Event>,
  pub derived: Vec<DerivedTime>,
}

impl EventBatch {
  pub fn len(&self) -> usize {
    self.events.len()
  }

  pub fn is_empty(&self) -> bool {
    self.events.is_empty()
  }
}

/// Pulls events file-by-file (in the sorted order `discover_csv_files`
/// returns) and hands out fixed-size batches, buffering only what doesn't
/// yet fill one batch. Nulls in `bid_price`/`total_price` pass through
/// untouched (§4.2).
pub struct Ingestor {
  files: VecDeque<PathBuf>,
  pending: VecDeque<Event>,
  batch_size: usize,
  tz: Tz,
  files_consumed: usize,
}

impl Ingestor {
  pub fn open(dir: &str, tz: Tz, batch_size: usize) -> IngestResult<Self> {
    let files = discover_csv_files(dir)?.into_iter().collect();
    Ok(Self { files, pending: VecDeque::new(), batch_size, tz, files_consumed: 0 })
  }

  /// Total input files this ingestor will read across its lifetime; used to
  /// populate `CubeMeta::source_file_count`.
  pub fn total_files(&self) -> usize {
    self.files.len() + self.files_consumed
  }

  /// Files fully read so far; monotonically increasing, used for progress
  /// reporting in the prepare CLI.
  pub fn files_consumed(&self) -> usize {
    self.files_consumed
  }

  fn fill_pending(&mut self) -> IngestResult<()> {
    while self.pending.len() < self.batch_size {
      let Some(path) = self.files.pop_front() else { break };
      let events = read_events(&path)?;
      self.pending.extend(events);
      self.files_consumed += 1;
    }
    Ok(())
  }
}

impl Iterator for Ingestor {
  type Item = IngestResult<EventBatch>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Err(e) = self.fill_pending() {
      return Some(Err(e));
    }
    if self.pending.is_empty() {
      return None;
    }
    let take = self.pending.len().min(self.batch_size);
    let events: Vec<Event> = self.pending.drain(..take).collect();
    let derived: Result<Vec<DerivedTime>, IngestError> =
      events.iter().map(|e| encode_all(e.ts, &self.tz).map_err(IngestError::from)).collect();
    match derived {
      Ok(derived) => Some(Ok(EventBatch { events, derived })),
      Err(e) => Some(Err(e)),
    }
  }
}

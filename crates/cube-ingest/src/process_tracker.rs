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

//! In-memory progress tracking for the prepare phase. The engine is
//! single-process and predominantly single-threaded at the control-flow
//! level (§7 "Scheduling model"), so this is a plain `Mutex`, not an async
//! one — nothing here is ever held across a suspension point.

use chrono::{DateTime, Utc};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessState {
  Running,
  Success,
  Failed,
  CompletedWithErrors,
}

#[derive(Debug, Clone)]
pub struct ProcessInfo {
  pub process_name: String,
  pub start_time: DateTime<Utc>,
  pub end_time: Option<DateTime<Utc>>,
  pub state: ProcessState,
  pub error_message: Option<String>,
  pub records_processed: Option<u64>,
}

/// Tracks the stages of one prepare run (ingest, per-cube build, persist,
/// fallback load) for progress reporting. Not persisted across runs.
pub struct ProcessTracker {
  processes: Mutex<Vec<ProcessInfo>>,
}

impl Default for ProcessTracker {
  fn default() -> Self {
    Self::new()
  }
}

impl ProcessTracker {
  pub fn new() -> Self {
    Self { processes: Mutex::new(Vec::new()) }
  }

  pub fn start(&self, process_name: &str) {
    self.processes.lock().expect("process tracker mutex poisoned").push(ProcessInfo {
      process_name: process_name.to_string(),
      start_time: Utc::now(),
      end_time: None,
      state: ProcessState::Running,
      error_message: None,
      records_processed: None,
    });
  }

  pub fn complete(&self, state: ProcessState, records_processed: Option<u64>) {
    let mut processes = self.processes.lock().expect("process tracker mutex poisoned");
    if let Some(last) = processes.last_mut() {
      last.state = state;
      last.end_time = Some(Utc::now());
      last.records_processed = records_processed;
    }
  }

  pub fn fail(&self, error_message: impl Into<String>) {
    let mut processes = self.processes.lock().expect("process tracker mutex poisoned");
    if let Some(last) = processes.last_mut() {
      last.state = ProcessState::Failed;
      last.end_time = Some(Utc::now());
      last.error_message = Some(error_message.into());
    }
  }

  pub fn snapshot(&self) -> Vec<ProcessInfo> {
    self.processes.lock().expect("process tracker mutex poisoned").clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_start_then_complete_records_state() {
    let tracker = ProcessTracker::new();
    tracker.start("ingest");
    tracker.complete(ProcessState::Success, Some(245_000_000));
    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].state, ProcessState::Success);
    assert_eq!(snapshot[0].records_processed, Some(245_000_000));
    assert!(snapshot[0].end_time.is_some());
  }

  #[test]
  fn test_fail_records_error_message() {
    let tracker = ProcessTracker::new();
    tracker.start("build");
    tracker.fail("duplicate key after coalesce");
    let snapshot = tracker.snapshot();
    assert_eq!(snapshot[0].state, ProcessState::Failed);
    assert_eq!(snapshot[0].error_message.as_deref(), Some("duplicate key after coalesce"));
  }

  #[test]
  fn test_multiple_stages_tracked_in_order() {
    let tracker = ProcessTracker::new();
    tracker.start("ingest");
    tracker.complete(ProcessState::Success, None);
    tracker.start("build");
    tracker.complete(ProcessState::Success, None);
    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].process_name, "ingest");
    assert_eq!(snapshot[1].process_name, "build");
  }
}

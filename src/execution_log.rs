//! Append-only execution log, shareable across runs and pipelines.
//!
//! Entries are ordered by insertion: `seq` and `timestamp` are both assigned under the
//! lock, so the two orders always agree. Nothing is ever mutated or removed.
//!
//! A handle stamps its own pipeline name on the events it writes. Several pipelines can
//! share one log through [ExecutionLog::scoped] handles.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use crate::types::{LogEntry, LogStatus};

/// Thread-safe, cloneable handle to a log.
#[derive(Debug, Clone)]
pub struct ExecutionLog {
  pipeline_name: Arc<str>,
  entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl ExecutionLog {
  pub fn new(pipeline_name: impl Into<String>) -> Self {
    Self {
      pipeline_name: Arc::from(pipeline_name.into()),
      entries: Arc::new(Mutex::new(Vec::new())),
    }
  }

  /// Handle on the same entries that stamps `pipeline_name` on its events.
  pub fn scoped(&self, pipeline_name: &str) -> Self {
    Self {
      pipeline_name: Arc::from(pipeline_name),
      entries: self.entries.clone(),
    }
  }

  pub fn pipeline_name(&self) -> &str {
    &self.pipeline_name
  }

  fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
    // A panicking writer cannot leave a half-pushed entry behind.
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Appends `entry`, assigning its `seq` and `timestamp`. Returns the assigned `seq`.
  ///
  /// The entry keeps its own `pipeline_name`.
  pub fn record(&self, mut entry: LogEntry) -> u64 {
    match entry.status {
      LogStatus::Failed => warn!(
        pipeline = %entry.pipeline_name,
        item_id = entry.item_id.as_deref().unwrap_or("-"),
        stage = %entry.stage_name,
        detail = entry.detail.as_deref().unwrap_or(""),
        "stage failed"
      ),
      status => info!(
        pipeline = %entry.pipeline_name,
        item_id = entry.item_id.as_deref().unwrap_or("-"),
        stage = %entry.stage_name,
        status = %status,
        "stage event"
      ),
    }
    let mut entries = self.lock();
    let seq = entries.len() as u64;
    entry.seq = seq;
    entry.timestamp = Utc::now();
    entries.push(entry);
    seq
  }

  /// Records a stage event under this handle's pipeline name.
  pub fn event(
    &self,
    item_id: Option<&str>,
    stage_name: &str,
    status: LogStatus,
    detail: Option<String>,
  ) -> u64 {
    let mut entry = LogEntry::new(
      &*self.pipeline_name,
      item_id.map(String::from),
      stage_name,
      status,
    );
    entry.detail = detail;
    self.record(entry)
  }

  /// Immutable copy of all entries so far, in insertion order.
  pub fn snapshot(&self) -> Vec<LogEntry> {
    self.lock().clone()
  }

  /// Entries written under this handle's pipeline name with `seq >= from`.
  pub fn pipeline_entries_since(&self, from: u64) -> Vec<LogEntry> {
    self
      .lock()
      .iter()
      .skip(from as usize)
      .filter(|e| e.pipeline_name == *self.pipeline_name)
      .cloned()
      .collect()
  }

  /// Entries recorded for one item, in insertion order.
  pub fn entries_for_item(&self, item_id: &str) -> Vec<LogEntry> {
    self
      .lock()
      .iter()
      .filter(|e| e.item_id.as_deref() == Some(item_id))
      .cloned()
      .collect()
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }
}

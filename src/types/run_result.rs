//! Terminal artifact of one coordinator run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ItemOutcome, LogEntry, StageResult};
use crate::error::BatchFault;

/// Item counts by terminal status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
  pub total: usize,
  pub completed: usize,
  pub skipped: usize,
  pub failed: usize,
}

/// Report of one run: batch result, every item outcome and the execution log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
  pub run_id: Uuid,
  pub pipeline_name: String,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  /// Result of the batch stage. `payload` holds `item_count` on success.
  pub batch: StageResult,
  /// Set when the batch stage failed; `items` is then empty.
  pub batch_fault: Option<BatchFault>,
  /// Outcomes in batch order, gate-rejected items included.
  pub items: Vec<ItemOutcome>,
  pub log: Vec<LogEntry>,
}

impl RunResult {
  pub fn is_batch_fault(&self) -> bool {
    self.batch_fault.is_some()
  }

  /// `Err` when no work was performed because the batch stage failed.
  pub fn check(&self) -> Result<(), &BatchFault> {
    match &self.batch_fault {
      Some(fault) => Err(fault),
      None => Ok(()),
    }
  }

  pub fn outcome(&self, item_id: &str) -> Option<&ItemOutcome> {
    self.items.iter().find(|o| o.item_id == item_id)
  }

  pub fn completed(&self) -> impl Iterator<Item = &ItemOutcome> {
    self.items.iter().filter(|o| o.status.is_completed())
  }

  pub fn summary(&self) -> RunSummary {
    let mut summary = RunSummary {
      total: self.items.len(),
      ..RunSummary::default()
    };
    for outcome in &self.items {
      if outcome.status.is_completed() {
        summary.completed += 1;
      } else if outcome.status.is_skipped() {
        summary.skipped += 1;
      } else {
        summary.failed += 1;
      }
    }
    summary
  }
}

//! DTOs for the execution log: one entry per stage event.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of event recorded for a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
  Started,
  Success,
  Failed,
  /// Gate rejection; a business decision, not an error.
  Skipped,
}

impl fmt::Display for LogStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LogStatus::Started => write!(f, "started"),
      LogStatus::Success => write!(f, "success"),
      LogStatus::Failed => write!(f, "failed"),
      LogStatus::Skipped => write!(f, "skipped"),
    }
  }
}

/// One recorded event in the execution log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
  /// Insertion index within the run, assigned by the log.
  pub seq: u64,
  pub timestamp: DateTime<Utc>,
  pub pipeline_name: String,
  /// `None` for run-level events (the batch stage).
  pub item_id: Option<String>,
  pub stage_name: String,
  pub status: LogStatus,
  pub detail: Option<String>,
}

impl LogEntry {
  pub fn new(
    pipeline_name: impl Into<String>,
    item_id: Option<String>,
    stage_name: impl Into<String>,
    status: LogStatus,
  ) -> Self {
    Self {
      seq: 0,
      timestamp: Utc::now(),
      pipeline_name: pipeline_name.into(),
      item_id,
      stage_name: stage_name.into(),
      status,
      detail: None,
    }
  }

  pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
    self.detail = Some(detail.into());
    self
  }
}

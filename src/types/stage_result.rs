//! Result of invoking one stage for one item (or for the batch).

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Attributes, StageStatus};

/// Result of invoking one stage. Immutable once handed to an outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
  pub stage_name: String,
  pub status: StageStatus,
  /// Attributes returned by the collaborator (Success and Skipped only).
  pub payload: Option<Attributes>,
  /// Fault description (Failed only).
  pub error: Option<String>,
  /// Extra context, e.g. which fallback served the stage.
  pub note: Option<String>,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  pub duration_ms: u64,
}

impl StageResult {
  pub fn success(stage_name: impl Into<String>, payload: Attributes) -> Self {
    let now = Utc::now();
    Self {
      stage_name: stage_name.into(),
      status: StageStatus::Success,
      payload: Some(payload),
      error: None,
      note: None,
      started_at: now,
      finished_at: now,
      duration_ms: 0,
    }
  }

  pub fn failed(stage_name: impl Into<String>, error: impl Into<String>) -> Self {
    let now = Utc::now();
    Self {
      stage_name: stage_name.into(),
      status: StageStatus::Failed,
      payload: None,
      error: Some(error.into()),
      note: None,
      started_at: now,
      finished_at: now,
      duration_ms: 0,
    }
  }

  /// Stamps the invocation window measured by the invoker.
  pub fn timed(
    mut self,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    duration: Duration,
  ) -> Self {
    self.started_at = started_at;
    self.finished_at = finished_at;
    self.duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    self
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.note = Some(note.into());
    self
  }

  /// Marks a successful result as rejected by its gate. The payload stays for audit.
  pub fn into_skipped(mut self) -> Self {
    if self.status == StageStatus::Success {
      self.status = StageStatus::Skipped;
    }
    self
  }

  pub fn is_success(&self) -> bool {
    self.status == StageStatus::Success
  }

  pub fn is_failed(&self) -> bool {
    self.status == StageStatus::Failed
  }

  pub fn duration(&self) -> Duration {
    Duration::from_millis(self.duration_ms)
  }
}

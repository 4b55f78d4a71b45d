//! Status of a single stage invocation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a single stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
  Success,
  Failed,
  /// The call succeeded but the stage's gate rejected the item.
  Skipped,
}

impl fmt::Display for StageStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StageStatus::Success => write!(f, "success"),
      StageStatus::Failed => write!(f, "failed"),
      StageStatus::Skipped => write!(f, "skipped"),
    }
  }
}

//! Terminal status of one item's pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage number of the batch stage.
pub const BATCH_STAGE_NUMBER: usize = 1;
/// Gate number of the batch-level gate.
pub const BATCH_GATE_NUMBER: usize = 0;
/// Stage number of the first item stage; item stage `i` (0-based) is `FIRST_ITEM_STAGE + i`.
pub const FIRST_ITEM_STAGE: usize = 2;

/// Terminal status of one item. Exactly one per item per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
  Completed,
  SkippedAtGate(usize),
  FailedAtStage(usize),
}

impl ItemStatus {
  pub fn is_completed(&self) -> bool {
    matches!(self, ItemStatus::Completed)
  }

  pub fn is_skipped(&self) -> bool {
    matches!(self, ItemStatus::SkippedAtGate(_))
  }

  pub fn is_failed(&self) -> bool {
    matches!(self, ItemStatus::FailedAtStage(_))
  }
}

impl fmt::Display for ItemStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ItemStatus::Completed => write!(f, "completed"),
      ItemStatus::SkippedAtGate(n) => write!(f, "skipped_at_gate_{}", n),
      ItemStatus::FailedAtStage(n) => write!(f, "failed_at_stage_{}", n),
    }
  }
}

//! Per-item record of stage results and final status.

use serde::{Deserialize, Serialize};

use super::{Item, ItemStatus, StageResult};

/// Everything one item went through in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutcome {
  pub item_id: String,
  /// Item as it stood when its pipeline stopped (merged payloads of passed stages).
  pub item: Item,
  /// Stage results in execution order.
  pub stages: Vec<StageResult>,
  pub status: ItemStatus,
}

impl ItemOutcome {
  /// Outcome for an item rejected by the batch-level gate; no item stage ran.
  pub fn skipped_at_batch_gate(item: Item) -> Self {
    Self {
      item_id: item.id.clone(),
      item,
      stages: vec![],
      status: ItemStatus::SkippedAtGate(super::BATCH_GATE_NUMBER),
    }
  }

  pub fn stage_names(&self) -> Vec<&str> {
    self.stages.iter().map(|s| s.stage_name.as_str()).collect()
  }

  pub fn stage(&self, name: &str) -> Option<&StageResult> {
    self.stages.iter().find(|s| s.stage_name == name)
  }
}

//! Data model shared by the invoker, gate, pipelines and coordinator.

mod item;
mod item_outcome;
mod item_status;
mod log_entry;
mod run_result;
mod stage_result;
mod stage_status;
mod threshold_spec;
#[cfg(test)]
mod threshold_spec_test;

pub use item::Item;
pub use item_outcome::ItemOutcome;
pub use item_status::{BATCH_GATE_NUMBER, BATCH_STAGE_NUMBER, FIRST_ITEM_STAGE, ItemStatus};
pub use log_entry::{LogEntry, LogStatus};
pub use run_result::{RunResult, RunSummary};
pub use stage_result::StageResult;
pub use stage_status::StageStatus;
pub use threshold_spec::{Comparator, ThresholdSpec};

/// Attribute bag carried by an item and returned by item stages.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

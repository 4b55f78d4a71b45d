//! # agent-chain
//!
//! Orchestration core for chained agent stages: a batch stage produces items, a
//! threshold gate filters them, and every survivor runs the same sequence of enrichment
//! stages concurrently, each item isolated from the others' failures.
//!
//! ## Architecture
//!
//! - [PipelineCoordinator] runs the batch stage, applies the batch gate and fans out.
//! - [FanOutCoordinator] runs one [ItemPipeline] per item, optionally bounded.
//! - [ItemPipeline] walks the [StageSpec] sequence, checking gates between stages.
//! - [StageInvoker] wraps every collaborator call (timeout, panic capture, timing).
//! - [ExecutionLog] records every stage event of a run, in insertion order.
//!
//! Collaborators plug in through the [BatchStage] and [ItemStage] traits.

pub mod collaborator;
pub mod config;
#[cfg(test)]
mod config_test;
pub mod coordinator;
#[cfg(test)]
mod coordinator_test;
pub mod error;
#[cfg(test)]
mod error_test;
pub mod execution_log;
pub mod fan_out;
pub mod gate;
pub mod invoker;
pub mod item_pipeline;
pub mod response;
pub mod run_report_io;
pub mod stage_spec;
pub mod types;

pub use collaborator::{
  BatchStage, ItemStage, batch_stage, item_stage, text_batch_stage, text_item_stage,
};
pub use config::PipelineConfig;
pub use coordinator::PipelineCoordinator;
pub use error::{BatchFault, ConfigError, RunReportError, StageError, ThresholdParseError};
pub use execution_log::ExecutionLog;
pub use fan_out::FanOutCoordinator;
pub use gate::GateDecision;
pub use invoker::StageInvoker;
pub use item_pipeline::{ItemPipeline, StageProgress};
pub use stage_spec::StageSpec;
pub use types::{
  Attributes, Comparator, Item, ItemOutcome, ItemStatus, LogEntry, LogStatus, RunResult,
  RunSummary, StageResult, StageStatus, ThresholdSpec,
};

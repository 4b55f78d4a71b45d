//! Pipeline coordinator: batch stage, batch-level gate, fan-out, run report.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::collaborator::BatchStage;
use crate::config::PipelineConfig;
use crate::error::BatchFault;
use crate::execution_log::ExecutionLog;
use crate::fan_out::FanOutCoordinator;
use crate::gate;
use crate::invoker::StageInvoker;
use crate::item_pipeline::ItemPipeline;
use crate::stage_spec::StageSpec;
use crate::types::{Item, ItemOutcome, LogStatus, RunResult, ThresholdSpec};

/// Runs a whole pipeline definition once per call to [PipelineCoordinator::run].
#[derive(Debug, Clone)]
pub struct PipelineCoordinator {
  config: PipelineConfig,
}

impl PipelineCoordinator {
  pub fn new(config: PipelineConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  /// Runs with a fresh execution log.
  pub async fn run(
    &self,
    batch: &dyn BatchStage,
    stages: Vec<StageSpec>,
    batch_gate: Option<&ThresholdSpec>,
  ) -> RunResult {
    let log = ExecutionLog::new(self.config.pipeline_name.clone());
    self.run_with_log(batch, stages, batch_gate, &log).await
  }

  /// Runs, writing into `log` so callers can take snapshots while the run is in flight.
  /// `log` may be shared with other pipelines: this run's events carry its own pipeline
  /// name, and `RunResult.log` holds only the entries of this pipeline written since the
  /// run started.
  ///
  /// Always returns a report: a failed batch stage yields a `batch_fault` and no items.
  #[instrument(
    level = "trace",
    skip(self, batch, stages, log),
    fields(pipeline = %self.config.pipeline_name, batch = batch.name())
  )]
  pub async fn run_with_log(
    &self,
    batch: &dyn BatchStage,
    stages: Vec<StageSpec>,
    batch_gate: Option<&ThresholdSpec>,
    log: &ExecutionLog,
  ) -> RunResult {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let invoker = StageInvoker::new(self.config.stage_timeout);
    let log = log.scoped(&self.config.pipeline_name);
    let from_seq = log.len() as u64;
    info!(%run_id, stages = stages.len(), "run starting");

    log.event(None, batch.name(), LogStatus::Started, None);
    let (batch_result, produced) = invoker.invoke_batch(batch, &self.config).await;
    let Some(produced) = produced else {
      let fault = BatchFault {
        stage_name: batch.name().to_string(),
        error: batch_result.error.clone().unwrap_or_default(),
      };
      log.event(None, batch.name(), LogStatus::Failed, batch_result.error.clone());
      warn!(%run_id, error = %fault, "batch stage failed, nothing fanned out");
      return RunResult {
        run_id,
        pipeline_name: self.config.pipeline_name.clone(),
        started_at,
        finished_at: Utc::now(),
        batch: batch_result,
        batch_fault: Some(fault),
        items: vec![],
        log: log.pipeline_entries_since(from_seq),
      };
    };

    let (items, detail) = self.admit(produced);
    log.event(None, batch.name(), LogStatus::Success, Some(detail));

    // Slots keep batch order across gate-rejected and fanned-out items.
    let mut slots: Vec<Option<ItemOutcome>> = vec![None; items.len()];
    let mut survivors = Vec::with_capacity(items.len());
    let mut survivor_slots = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
      match batch_gate {
        Some(spec) if !gate::evaluate(&item, spec).passed() => {
          log.event(
            Some(&item.id),
            batch.name(),
            LogStatus::Skipped,
            Some(gate::rejection_detail(&item, spec)),
          );
          slots[index] = Some(ItemOutcome::skipped_at_batch_gate(item));
        }
        _ => {
          survivors.push(item);
          survivor_slots.push(index);
        }
      }
    }
    info!(
      %run_id,
      fanned_out = survivors.len(),
      gated_out = slots.len() - survivors.len(),
      "batch gate applied"
    );

    let fan_out = FanOutCoordinator::new(
      ItemPipeline::new(invoker, log.clone()),
      self.config.max_concurrency,
    );
    let outcomes = fan_out.run(survivors, Arc::from(stages)).await;
    for (index, outcome) in survivor_slots.into_iter().zip(outcomes) {
      slots[index] = Some(outcome);
    }

    let result = RunResult {
      run_id,
      pipeline_name: self.config.pipeline_name.clone(),
      started_at,
      finished_at: Utc::now(),
      batch: batch_result,
      batch_fault: None,
      items: slots.into_iter().flatten().collect(),
      log: log.pipeline_entries_since(from_seq),
    };
    let summary = result.summary();
    info!(
      %run_id,
      total = summary.total,
      completed = summary.completed,
      skipped = summary.skipped,
      failed = summary.failed,
      "run finished"
    );
    result
  }

  /// Applies de-duplication and the item cap; returns the admitted items and a log detail.
  fn admit(&self, produced: Vec<Item>) -> (Vec<Item>, String) {
    let total = produced.len();
    let mut items = produced;

    let mut duplicates = 0;
    if self.config.dedupe_by_id {
      let mut seen = HashSet::new();
      items.retain(|item| seen.insert(item.id.clone()));
      duplicates = total - items.len();
    }

    let mut capped = 0;
    if let Some(max) = self.config.max_items
      && items.len() > max
    {
      capped = items.len() - max;
      items.truncate(max);
    }

    if duplicates + capped > 0 {
      info!(total, duplicates, capped, admitted = items.len(), "batch trimmed");
    }
    let detail = format!(
      "produced {} items; {} duplicates dropped; {} over cap dropped",
      total, duplicates, capped
    );
    (items, detail)
  }
}

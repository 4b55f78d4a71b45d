//! Item pipeline: runs the stage sequence for one item until it completes, is gated
//! out, or a stage fails.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{info, instrument};

use crate::execution_log::ExecutionLog;
use crate::gate;
use crate::invoker::StageInvoker;
use crate::stage_spec::StageSpec;
use crate::types::{FIRST_ITEM_STAGE, Item, ItemOutcome, ItemStatus, LogStatus, StageResult};

/// Stage results an item has settled so far, readable from outside its task.
#[derive(Debug, Clone, Default)]
pub struct StageProgress(Arc<Mutex<Vec<StageResult>>>);

impl StageProgress {
  pub(crate) fn push(&self, result: StageResult) {
    self.0.lock().unwrap_or_else(PoisonError::into_inner).push(result);
  }

  pub fn snapshot(&self) -> Vec<StageResult> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }
}

/// Runs stage sequences for single items, logging every step.
#[derive(Debug, Clone)]
pub struct ItemPipeline {
  invoker: StageInvoker,
  log: ExecutionLog,
}

impl ItemPipeline {
  pub fn new(invoker: StageInvoker, log: ExecutionLog) -> Self {
    Self { invoker, log }
  }

  pub fn log(&self) -> &ExecutionLog {
    &self.log
  }

  /// Runs `stages` in order on `item`. Stage `i` is numbered `FIRST_ITEM_STAGE + i`.
  ///
  /// - a failed stage stops the item with `FailedAtStage(n)`;
  /// - a rejecting gate stops it with `SkippedAtGate(n)`, the stage result becoming `Skipped`;
  /// - otherwise the payload is merged and the next stage runs.
  pub async fn run(&self, item: Item, stages: &[StageSpec]) -> ItemOutcome {
    self.run_tracked(item, stages, &StageProgress::default()).await
  }

  /// Like [ItemPipeline::run], also pushing each settled stage result into `progress`.
  #[instrument(level = "trace", skip(self, item, stages, progress), fields(item_id = %item.id))]
  pub async fn run_tracked(
    &self,
    mut item: Item,
    stages: &[StageSpec],
    progress: &StageProgress,
  ) -> ItemOutcome {
    let mut results = Vec::with_capacity(stages.len());
    let mut status = ItemStatus::Completed;

    for (index, spec) in stages.iter().enumerate() {
      let number = FIRST_ITEM_STAGE + index;
      let result = self.invoke_stage(&item, spec).await;
      if result.is_failed() {
        progress.push(result.clone());
        results.push(result);
        status = ItemStatus::FailedAtStage(number);
        break;
      }

      let candidate = match &result.payload {
        Some(payload) => item.merged(payload),
        None => item.clone(),
      };
      if let Some(threshold) = &spec.gate
        && !gate::evaluate(&candidate, threshold).passed()
      {
        self.log.event(
          Some(&item.id),
          spec.name(),
          LogStatus::Skipped,
          Some(gate::rejection_detail(&candidate, threshold)),
        );
        let skipped = result.into_skipped();
        progress.push(skipped.clone());
        results.push(skipped);
        status = ItemStatus::SkippedAtGate(number);
        break;
      }
      item = candidate;
      progress.push(result.clone());
      results.push(result);
    }

    info!(item_id = %item.id, status = %status, stages = results.len(), "item pipeline finished");
    ItemOutcome {
      item_id: item.id.clone(),
      item,
      stages: results,
      status,
    }
  }

  /// Invokes one stage (falling back when configured) and logs its start and end.
  async fn invoke_stage(&self, item: &Item, spec: &StageSpec) -> StageResult {
    let invoker = self.invoker.overridden(spec.timeout);
    let name = spec.name();
    self.log.event(Some(&item.id), name, LogStatus::Started, None);
    let primary = invoker.invoke_item(spec.stage.as_ref(), item).await;

    let result = match &spec.fallback {
      Some(fallback) if primary.is_failed() => {
        let primary_error = primary.error.clone().unwrap_or_default();
        self.log.event(
          Some(&item.id),
          name,
          LogStatus::Failed,
          Some(format!("falling back to '{}': {}", fallback.name(), primary_error)),
        );
        self
          .log
          .event(Some(&item.id), fallback.name(), LogStatus::Started, None);
        let secondary = invoker.invoke_item(fallback.as_ref(), item).await;
        self.log.event(
          Some(&item.id),
          fallback.name(),
          log_status(&secondary),
          secondary.error.clone(),
        );
        combine_with_fallback(name, fallback.name(), &primary_error, primary, secondary)
      }
      _ => primary,
    };

    self
      .log
      .event(Some(&item.id), name, log_status(&result), result.error.clone());
    result
  }
}

fn log_status(result: &StageResult) -> LogStatus {
  if result.is_failed() {
    LogStatus::Failed
  } else {
    LogStatus::Success
  }
}

/// Folds a primary failure and its fallback attempt into one result under the declared name.
fn combine_with_fallback(
  name: &str,
  fallback_name: &str,
  primary_error: &str,
  primary: StageResult,
  secondary: StageResult,
) -> StageResult {
  let duration = Duration::from_millis(primary.duration_ms.saturating_add(secondary.duration_ms));
  let combined = match (secondary.is_failed(), secondary.payload) {
    (false, Some(payload)) => StageResult::success(name, payload).with_note(format!(
      "served by fallback '{}' after: {}",
      fallback_name, primary_error
    )),
    _ => StageResult::failed(
      name,
      format!(
        "{}; fallback '{}': {}",
        primary_error,
        fallback_name,
        secondary.error.as_deref().unwrap_or("no payload")
      ),
    ),
  };
  combined.timed(primary.started_at, secondary.finished_at, duration)
}

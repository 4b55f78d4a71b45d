//! Fan-out: one concurrent item pipeline per item, optionally bounded.
//!
//! Items start in arrival order: a slot is acquired *before* the item's task is spawned,
//! so a queued item never overtakes an earlier one. Every item yields exactly one outcome,
//! returned in input order.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use crate::item_pipeline::{ItemPipeline, StageProgress};
use crate::stage_spec::StageSpec;
use crate::types::{FIRST_ITEM_STAGE, Item, ItemOutcome, ItemStatus, LogStatus, StageResult};

/// Stage name recorded when an item's task dies outside the invoker.
const ABORTED_STAGE: &str = "item_pipeline";

/// Runs an [ItemPipeline] for every item concurrently.
#[derive(Debug, Clone)]
pub struct FanOutCoordinator {
  pipeline: ItemPipeline,
  max_concurrency: Option<usize>,
}

impl FanOutCoordinator {
  /// `max_concurrency` bounds in-flight pipelines; `None` starts all items at once.
  pub fn new(pipeline: ItemPipeline, max_concurrency: Option<usize>) -> Self {
    Self {
      pipeline,
      max_concurrency,
    }
  }

  /// Runs `stages` for every item and waits for all of them.
  #[instrument(level = "trace", skip(self, items, stages), fields(items = items.len()))]
  pub async fn run(&self, items: Vec<Item>, stages: Arc<[StageSpec]>) -> Vec<ItemOutcome> {
    if items.is_empty() {
      return vec![];
    }
    let limit = self.max_concurrency.unwrap_or(items.len()).max(1);
    let slots = Arc::new(Semaphore::new(limit));
    info!(items = items.len(), limit, "fan-out starting");

    let mut launched = Vec::with_capacity(items.len());
    for item in items {
      // Only fails if the semaphore is closed, which never happens here.
      let permit = slots.clone().acquire_owned().await.ok();
      let pipeline = self.pipeline.clone();
      let stages = stages.clone();
      let item_copy = item.clone();
      let progress = StageProgress::default();
      let tracked = progress.clone();
      let handle = tokio::spawn(async move {
        let _permit = permit;
        pipeline.run_tracked(item, &stages, &tracked).await
      });
      launched.push((item_copy, progress, handle));
    }

    let mut pending = Vec::with_capacity(launched.len());
    let mut handles = Vec::with_capacity(launched.len());
    for (item, progress, handle) in launched {
      pending.push((item, progress));
      handles.push(handle);
    }
    let joined = join_all(handles).await;
    pending
      .into_iter()
      .zip(joined)
      .map(|((item, progress), joined)| match joined {
        Ok(outcome) => outcome,
        Err(e) => self.aborted(item, &stages, &progress, &e.to_string()),
      })
      .collect()
  }

  /// Outcome for an item whose task panicked or was cancelled by the runtime.
  ///
  /// Keeps the stage results settled before the abort and blames the stage after them,
  /// numbered as the item pipeline numbers it.
  pub(crate) fn aborted(
    &self,
    item: Item,
    stages: &[StageSpec],
    progress: &StageProgress,
    reason: &str,
  ) -> ItemOutcome {
    let mut settled = progress.snapshot();
    // With every stage settled the abort hit after the last one; blame that one.
    let index = settled.len().min(stages.len().saturating_sub(1));
    settled.truncate(index);
    let mut item = item;
    for result in settled.iter().filter(|r| r.is_success()) {
      if let Some(payload) = &result.payload {
        item.merge(payload);
      }
    }

    let stage_name = stages.get(index).map_or(ABORTED_STAGE, |s| s.name());
    let error = format!("pipeline task aborted: {}", reason);
    warn!(item_id = %item.id, stage = stage_name, reason, "item pipeline task aborted");
    self.pipeline.log().event(
      Some(&item.id),
      stage_name,
      LogStatus::Failed,
      Some(error.clone()),
    );
    settled.push(StageResult::failed(stage_name, error));
    ItemOutcome {
      item_id: item.id.clone(),
      item,
      stages: settled,
      status: ItemStatus::FailedAtStage(FIRST_ITEM_STAGE + index),
    }
  }
}

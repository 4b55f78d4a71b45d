//! Tests for `PipelineCoordinator`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use crate::collaborator::{batch_stage, item_stage, text_batch_stage};
use crate::config::PipelineConfig;
use crate::coordinator::PipelineCoordinator;
use crate::error::StageError;
use crate::execution_log::ExecutionLog;
use crate::stage_spec::StageSpec;
use crate::types::{Attributes, Item, ItemStatus, LogStatus, StageStatus, ThresholdSpec};

fn noop(name: &str) -> StageSpec {
  StageSpec::new(item_stage(name.to_string(), |_item: Item| async {
    Ok::<_, StageError>(Attributes::new())
  }))
}

fn scored(ids: &[(&str, i64)]) -> Vec<Item> {
  ids
    .iter()
    .map(|(id, score)| Item::new(*id).with_attr("score", *score))
    .collect()
}

#[tokio::test]
async fn batch_gate_partitions_and_keeps_order() {
  let batch = batch_stage("scout", |_config| async {
    Ok::<_, StageError>(scored(&[("a", 80), ("b", 50), ("c", 95)]))
  });
  let coordinator = PipelineCoordinator::new(PipelineConfig::new("recruiting"));
  let result = coordinator
    .run(
      &batch,
      vec![noop("profile")],
      Some(&ThresholdSpec::gt("score", 70.0)),
    )
    .await;

  assert!(result.check().is_ok());
  let statuses: Vec<_> = result
    .items
    .iter()
    .map(|o| (o.item_id.as_str(), o.status))
    .collect();
  assert_eq!(
    statuses,
    vec![
      ("a", ItemStatus::Completed),
      ("b", ItemStatus::SkippedAtGate(0)),
      ("c", ItemStatus::Completed),
    ]
  );
  assert!(result.outcome("b").unwrap().stages.is_empty());
  assert_eq!(result.batch.status, StageStatus::Success);
  assert_eq!(
    result.batch.payload.as_ref().unwrap().get("item_count"),
    Some(&json!(3))
  );
}

#[tokio::test]
async fn batch_fault_stops_the_run() {
  let fanned = Arc::new(AtomicUsize::new(0));
  let counter = fanned.clone();
  let batch = batch_stage("scout", |_config| async {
    Err::<Vec<Item>, _>(StageError::call("search API down"))
  });
  let stage = item_stage("profile", move |_item: Item| {
    counter.fetch_add(1, Ordering::SeqCst);
    async { Ok::<_, StageError>(Attributes::new()) }
  });
  let result = PipelineCoordinator::new(PipelineConfig::new("p"))
    .run(&batch, vec![StageSpec::new(stage)], None)
    .await;

  assert!(result.is_batch_fault());
  let fault = result.check().unwrap_err();
  assert_eq!(fault.stage_name, "scout");
  assert!(fault.error.contains("search API down"));
  assert!(result.items.is_empty());
  assert_eq!(fanned.load(Ordering::SeqCst), 0);
  let last = result.log.last().unwrap();
  assert_eq!(last.status, LogStatus::Failed);
  assert_eq!(last.item_id, None);
}

#[tokio::test]
async fn malformed_batch_response_is_a_batch_fault() {
  let batch = text_batch_stage("signals", "url", |_config| async {
    Ok::<_, StageError>("No signals today, sorry.".to_string())
  });
  let result = PipelineCoordinator::new(PipelineConfig::new("p"))
    .run(&batch, vec![noop("analyze")], None)
    .await;
  assert!(result.is_batch_fault());
  assert!(result.batch_fault.unwrap().error.starts_with("malformed response"));
}

#[tokio::test]
async fn empty_batch_is_a_clean_run() {
  let batch = batch_stage("scout", |_config| async { Ok::<_, StageError>(vec![]) });
  let result = PipelineCoordinator::new(PipelineConfig::new("p"))
    .run(&batch, vec![noop("profile")], None)
    .await;
  assert!(!result.is_batch_fault());
  assert!(result.items.is_empty());
  assert_eq!(result.summary().total, 0);
}

#[tokio::test]
async fn dedupe_keeps_first_occurrence() {
  let batch = batch_stage("signals", |_config| async {
    Ok::<_, StageError>(vec![
      Item::new("u1").with_attr("rank", 1),
      Item::new("u2"),
      Item::new("u1").with_attr("rank", 3),
    ])
  });
  let config = PipelineConfig::new("p").with_dedupe_by_id(true);
  let result = PipelineCoordinator::new(config)
    .run(&batch, vec![noop("analyze")], None)
    .await;
  let ids: Vec<_> = result.items.iter().map(|o| o.item_id.as_str()).collect();
  assert_eq!(ids, vec!["u1", "u2"]);
  assert_eq!(result.outcome("u1").unwrap().item.get("rank"), Some(&json!(1)));
}

#[tokio::test]
async fn duplicates_are_kept_without_dedupe() {
  let batch = batch_stage("signals", |_config| async {
    Ok::<_, StageError>(vec![Item::new("u1"), Item::new("u1")])
  });
  let result = PipelineCoordinator::new(PipelineConfig::new("p"))
    .run(&batch, vec![noop("analyze")], None)
    .await;
  assert_eq!(result.items.len(), 2);
}

#[tokio::test]
async fn max_items_caps_before_the_gate() {
  let batch = batch_stage("signals", |_config| async {
    Ok::<_, StageError>(scored(&[("a", 10), ("b", 90), ("c", 90), ("d", 90)]))
  });
  let config = PipelineConfig::new("p").with_max_items(2);
  let result = PipelineCoordinator::new(config)
    .run(
      &batch,
      vec![noop("analyze")],
      Some(&ThresholdSpec::gt("score", 50.0)),
    )
    .await;
  let statuses: Vec<_> = result.items.iter().map(|o| o.status).collect();
  assert_eq!(
    statuses,
    vec![ItemStatus::SkippedAtGate(0), ItemStatus::Completed]
  );
  let batch_done = result
    .log
    .iter()
    .find(|e| e.item_id.is_none() && e.status == LogStatus::Success)
    .unwrap();
  assert!(batch_done.detail.as_deref().unwrap().contains("2 over cap dropped"));
}

#[tokio::test]
async fn batch_stage_receives_config_params() {
  let batch = batch_stage("scout", |config: PipelineConfig| async move {
    let role = config.params.get("role").cloned().unwrap_or_default();
    Ok::<_, StageError>(vec![Item::new("a").with_attr("role", role)])
  });
  let config = PipelineConfig::new("p").with_param("role", "account executive");
  let result = PipelineCoordinator::new(config)
    .run(&batch, vec![], None)
    .await;
  assert_eq!(
    result.items[0].item.get("role"),
    Some(&json!("account executive"))
  );
}

#[tokio::test]
async fn external_log_sees_the_whole_run() {
  let batch = batch_stage("scout", |_config| async {
    Ok::<_, StageError>(vec![Item::new("a")])
  });
  let log = ExecutionLog::new("p");
  let result = PipelineCoordinator::new(PipelineConfig::new("p"))
    .run_with_log(&batch, vec![noop("profile")], None, &log)
    .await;
  assert_eq!(log.snapshot(), result.log);
  // batch start/end plus item stage start/end
  assert_eq!(log.len(), 4);
  assert!(log.snapshot().iter().all(|e| e.pipeline_name == "p"));
}

#[tokio::test]
async fn summary_counts_each_status() {
  let batch = batch_stage("scout", |_config| async {
    Ok::<_, StageError>(scored(&[("ok", 90), ("low", 10), ("bad", 90)]))
  });
  let stage = item_stage("profile", |item: Item| async move {
    if item.id == "bad" {
      Err(StageError::call("boom"))
    } else {
      Ok(Attributes::new())
    }
  });
  let result = PipelineCoordinator::new(PipelineConfig::new("p"))
    .run(
      &batch,
      vec![StageSpec::new(stage)],
      Some(&ThresholdSpec::gt("score", 50.0)),
    )
    .await;
  let summary = result.summary();
  assert_eq!(
    (summary.total, summary.completed, summary.skipped, summary.failed),
    (3, 1, 1, 1)
  );
}

#[tokio::test]
async fn coordinators_sharing_a_log_stamp_their_own_names() {
  let log = ExecutionLog::new("orchestrator");
  let scout = batch_stage("scout", |_config| async {
    Ok::<_, StageError>(vec![Item::new("anna")])
  });
  let signals = batch_stage("signals", |_config| async {
    Ok::<_, StageError>(vec![Item::new("u1"), Item::new("u2")])
  });

  let recruiting = PipelineCoordinator::new(PipelineConfig::new("recruiting"))
    .run_with_log(&scout, vec![noop("profile")], None, &log)
    .await;
  let content = PipelineCoordinator::new(PipelineConfig::new("content"))
    .run_with_log(&signals, vec![noop("ghostwrite")], None, &log)
    .await;

  assert!(recruiting.log.iter().all(|e| e.pipeline_name == "recruiting"));
  assert!(content.log.iter().all(|e| e.pipeline_name == "content"));
  // batch start/end plus two entries per item
  assert_eq!(recruiting.log.len(), 4);
  assert_eq!(content.log.len(), 6);
  assert_eq!(log.len(), 10);
  assert!(content.log.iter().all(|e| e.seq >= 4));
}

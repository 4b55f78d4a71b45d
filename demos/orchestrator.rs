//! Two pipelines with mock collaborators, run side by side on one shared execution log:
//!
//! - recruiting: scout (batch) → score gate → profile (revenue gate) → outreach → schedule
//! - content: signals (batch, deduped, top 3) → ghostwrite
//!
//! Run: `cargo run --example orchestrator`
//! Set RUST_LOG=agent_chain=trace for span and stage events, and AGENT_CHAIN_REPORT_DIR
//! to save both run reports.

use std::time::Duration;

use agent_chain::{
  Attributes, BatchStage, ExecutionLog, Item, PipelineConfig, PipelineCoordinator, RunResult,
  StageError, StageSpec, ThresholdParseError, ThresholdSpec, batch_stage, item_stage,
  run_report_io, text_batch_stage, text_item_stage,
};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn candidates() -> Vec<Item> {
  [
    ("anna", 82, 320_000),
    ("ben", 55, 400_000),
    ("carl", 91, 120_000),
    ("dina", 77, 310_000),
    ("emil", 88, 0),
  ]
  .into_iter()
  .map(|(id, score, book)| {
    Item::new(id)
      .with_attr("score", score)
      .with_attr("book_of_business", book)
  })
  .collect()
}

fn recruiting() -> Result<(impl BatchStage, Vec<StageSpec>), ThresholdParseError> {
  let scout = batch_stage("scout", |config: PipelineConfig| async move {
    info!(role = ?config.params.get("role"), "scouting candidates");
    Ok::<_, StageError>(candidates())
  });

  // The profiler answers in free text, like a chat model would.
  let profile = text_item_stage("profile", |item: Item| async move {
    if item.id == "emil" {
      return Ok::<_, StageError>("I could not find this person's history.".to_string());
    }
    let book = item.number("book_of_business").unwrap_or_default();
    Ok(format!(
      "Here is the estimate:\n```json\n{}\n```",
      json!({ "portable_revenue": book * 0.7 })
    ))
  });

  let outreach = item_stage("outreach", |item: Item| async move {
    let mut out = Attributes::new();
    out.insert(
      "message".to_string(),
      json!(format!("Hi {}, a quick note about a role you may like.", item.id)),
    );
    Ok::<_, StageError>(out)
  });

  let schedule = item_stage("schedule", |item: Item| async move {
    if item.id == "dina" {
      return Err(StageError::call("calendar API returned 503"));
    }
    let mut out = Attributes::new();
    out.insert("meeting".to_string(), json!("2026-11-03T15:00:00Z"));
    Ok(out)
  });
  let schedule_manual = item_stage("schedule_manual", |_item: Item| async {
    let mut out = Attributes::new();
    out.insert("meeting".to_string(), json!("to be arranged by recruiter"));
    Ok::<_, StageError>(out)
  });

  let stages = vec![
    StageSpec::new(profile).gated("portable_revenue >= 200000".parse::<ThresholdSpec>()?),
    StageSpec::new(outreach),
    StageSpec::new(schedule).with_fallback(schedule_manual),
  ];
  Ok((scout, stages))
}

fn content() -> (impl BatchStage, Vec<StageSpec>) {
  // Ranked market signals; the scanner repeats a story it saw twice.
  let signals = text_batch_stage("signals", "url", |_config: PipelineConfig| async {
    let found = json!([
      { "url": "https://news.example/ma-wave", "headline": "Mid-market M&A wave" },
      { "url": "https://news.example/rate-cut", "headline": "Surprise rate cut" },
      { "url": "https://news.example/ma-wave", "headline": "Mid-market M&A wave" },
      { "url": "https://news.example/esg-rules", "headline": "New ESG reporting rules" },
      { "url": "https://news.example/ai-audit", "headline": "AI in audit" },
    ]);
    Ok::<_, StageError>(format!("Top signals today:\n```json\n{found}\n```"))
  });

  let ghostwrite = text_item_stage("ghostwrite", |item: Item| async move {
    let headline = item
      .get("headline")
      .and_then(|h| h.as_str())
      .unwrap_or("the market")
      .to_string();
    Ok::<_, StageError>(
      json!({ "post": format!("Three thoughts on {headline} for our clients.") }).to_string(),
    )
  });

  (signals, vec![StageSpec::new(ghostwrite)])
}

fn report(result: &RunResult) {
  println!("== {} ({})", result.pipeline_name, result.run_id);
  if let Err(fault) = result.check() {
    println!("   {fault}");
    return;
  }
  for outcome in &result.items {
    println!("   {:<32} {}", outcome.item_id, outcome.status);
  }
  let summary = result.summary();
  println!(
    "   total={} completed={} skipped={} failed={} log_entries={}",
    summary.total,
    summary.completed,
    summary.skipped,
    summary.failed,
    result.log.len()
  );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let recruiting_config = PipelineConfig::new("recruiting")
    .with_stage_timeout(Duration::from_secs(5))
    .with_max_concurrency(3)
    .with_param("role", "enterprise account executive")
    .from_env()?;
  let content_config = PipelineConfig::new("content")
    .with_stage_timeout(Duration::from_secs(5))
    .with_dedupe_by_id(true)
    .with_max_items(3);

  let (scout, recruiting_stages) = recruiting()?;
  let (signals, content_stages) = content();
  let score_gate = ThresholdSpec::gt("score", 70.0);

  let log = ExecutionLog::new("orchestrator");
  let recruiting = PipelineCoordinator::new(recruiting_config);
  let content = PipelineCoordinator::new(content_config);
  let (recruiting_result, content_result) = tokio::join!(
    recruiting.run_with_log(&scout, recruiting_stages, Some(&score_gate), &log),
    content.run_with_log(&signals, content_stages, None, &log),
  );

  report(&recruiting_result);
  report(&content_result);
  println!("shared log: {} entries", log.len());

  if let Ok(dir) = std::env::var("AGENT_CHAIN_REPORT_DIR") {
    for result in [&recruiting_result, &content_result] {
      let path = run_report_io::save_run_result_in(std::path::Path::new(&dir), result)?;
      println!("report written to {}", path.display());
    }
  }
  Ok(())
}

//! Stage invoker: runs one collaborator call and captures every fault.
//!
//! Errors, malformed responses, timeouts and panics all come back as a failed
//! [Invocation]; nothing escapes to the caller.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde_json::json;
use tracing::{debug, instrument};

use crate::collaborator::{BatchStage, ItemStage};
use crate::config::PipelineConfig;
use crate::error::StageError;
use crate::types::{Attributes, Item, StageResult};

/// Captured result of one call, with its timing window.
#[derive(Debug)]
pub struct Invocation<T> {
  pub stage_name: String,
  pub outcome: Result<T, StageError>,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  pub duration: Duration,
}

impl<T> Invocation<T> {
  pub fn is_ok(&self) -> bool {
    self.outcome.is_ok()
  }

  /// Splits into a [StageResult] (payload built by `summarize`) and the raw value on success.
  pub fn into_parts<F>(self, summarize: F) -> (StageResult, Option<T>)
  where
    F: FnOnce(&T) -> Attributes,
  {
    let (result, value) = match self.outcome {
      Ok(value) => (
        StageResult::success(&self.stage_name, summarize(&value)),
        Some(value),
      ),
      Err(e) => (StageResult::failed(&self.stage_name, e.to_string()), None),
    };
    (
      result.timed(self.started_at, self.finished_at, self.duration),
      value,
    )
  }
}

impl Invocation<Attributes> {
  pub fn into_stage_result(self) -> StageResult {
    let window = (self.started_at, self.finished_at, self.duration);
    let result = match self.outcome {
      Ok(payload) => StageResult::success(self.stage_name, payload),
      Err(e) => StageResult::failed(self.stage_name, e.to_string()),
    };
    result.timed(window.0, window.1, window.2)
  }
}

/// Runs collaborator calls under an optional timeout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageInvoker {
  timeout: Option<Duration>,
}

impl StageInvoker {
  pub fn new(timeout: Option<Duration>) -> Self {
    Self { timeout }
  }

  pub fn timeout(&self) -> Option<Duration> {
    self.timeout
  }

  /// Same invoker with `timeout` replacing the current one when it is `Some`.
  pub fn overridden(self, timeout: Option<Duration>) -> Self {
    Self {
      timeout: timeout.or(self.timeout),
    }
  }

  /// Awaits `call`, converting errors, timeout expiry and panics into a failed outcome.
  #[instrument(level = "trace", skip(self, call))]
  pub async fn invoke<T, Fut>(&self, stage_name: &str, call: Fut) -> Invocation<T>
  where
    Fut: Future<Output = Result<T, StageError>>,
  {
    let started_at = Utc::now();
    let start = Instant::now();
    let guarded = AssertUnwindSafe(call).catch_unwind();
    let outcome = match self.timeout {
      Some(limit) => match tokio::time::timeout(limit, guarded).await {
        Ok(caught) => flatten(caught),
        Err(_) => Err(StageError::Timeout(limit)),
      },
      None => flatten(guarded.await),
    };
    let duration = start.elapsed();
    debug!(
      stage = stage_name,
      ok = outcome.is_ok(),
      duration_ms = duration.as_millis() as u64,
      "invocation finished"
    );
    Invocation {
      stage_name: stage_name.to_string(),
      outcome,
      started_at,
      finished_at: Utc::now(),
      duration,
    }
  }

  /// Invokes an item stage on `item`.
  pub async fn invoke_item(&self, stage: &dyn ItemStage, item: &Item) -> StageResult {
    self
      .invoke(stage.name(), stage.enrich(item))
      .await
      .into_stage_result()
  }

  /// Invokes the batch stage. The stage result's payload records `item_count`.
  pub async fn invoke_batch(
    &self,
    stage: &dyn BatchStage,
    config: &PipelineConfig,
  ) -> (StageResult, Option<Vec<Item>>) {
    self
      .invoke(stage.name(), stage.produce(config))
      .await
      .into_parts(|items| {
        let mut summary = Attributes::new();
        summary.insert("item_count".to_string(), json!(items.len()));
        summary
      })
  }
}

fn flatten<T>(caught: Result<Result<T, StageError>, Box<dyn Any + Send>>) -> Result<T, StageError> {
  match caught {
    Ok(inner) => inner,
    Err(panic) => Err(StageError::Panicked(panic_message(panic.as_ref()))),
  }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
  if let Some(s) = panic.downcast_ref::<&str>() {
    (*s).to_string()
  } else if let Some(s) = panic.downcast_ref::<String>() {
    s.clone()
  } else {
    "non-string panic payload".to_string()
  }
}

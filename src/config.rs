//! Run configuration passed explicitly to the coordinator.
//!
//! Environment variables override the builder values when [PipelineConfig::from_env] is used:
//!
//! - `AGENT_CHAIN_STAGE_TIMEOUT_MS`  per-stage timeout in milliseconds (`0` disables it)
//! - `AGENT_CHAIN_MAX_CONCURRENCY`   max in-flight item pipelines (positive integer)
//! - `AGENT_CHAIN_MAX_ITEMS`         cap on batch items entering the run
//! - `AGENT_CHAIN_DEDUPE`            `1`/`true`/`yes`/`on` to drop repeated item ids

use std::time::Duration;

use serde_json::Value;
use tracing::instrument;

use crate::error::ConfigError;
use crate::types::Attributes;

pub const ENV_STAGE_TIMEOUT_MS: &str = "AGENT_CHAIN_STAGE_TIMEOUT_MS";
pub const ENV_MAX_CONCURRENCY: &str = "AGENT_CHAIN_MAX_CONCURRENCY";
pub const ENV_MAX_ITEMS: &str = "AGENT_CHAIN_MAX_ITEMS";
pub const ENV_DEDUPE: &str = "AGENT_CHAIN_DEDUPE";

/// Configuration for one pipeline definition.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
  /// Name stamped on every log entry and on the run result.
  pub pipeline_name: String,
  /// Timeout applied to every stage call unless the stage overrides it. `None` waits forever.
  pub stage_timeout: Option<Duration>,
  /// Max item pipelines in flight at once. `None` runs all items concurrently.
  pub max_concurrency: Option<usize>,
  /// Only the first `n` batch items enter the run.
  pub max_items: Option<usize>,
  /// Drop batch items whose id was already seen (first occurrence wins).
  pub dedupe_by_id: bool,
  /// Run input handed to the batch stage.
  pub params: Attributes,
}

impl PipelineConfig {
  pub fn new(pipeline_name: impl Into<String>) -> Self {
    Self {
      pipeline_name: pipeline_name.into(),
      stage_timeout: None,
      max_concurrency: None,
      max_items: None,
      dedupe_by_id: false,
      params: Attributes::new(),
    }
  }

  pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
    self.stage_timeout = Some(timeout);
    self
  }

  /// Bounds in-flight item pipelines. A bound of 0 is raised to 1.
  pub fn with_max_concurrency(mut self, max: usize) -> Self {
    self.max_concurrency = Some(max.max(1));
    self
  }

  pub fn with_max_items(mut self, max: usize) -> Self {
    self.max_items = Some(max);
    self
  }

  pub fn with_dedupe_by_id(mut self, dedupe: bool) -> Self {
    self.dedupe_by_id = dedupe;
    self
  }

  pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.params.insert(key.into(), value.into());
    self
  }

  /// Applies `AGENT_CHAIN_*` overrides from the process environment.
  pub fn from_env(self) -> Result<Self, ConfigError> {
    self.with_overrides(|var| std::env::var(var).ok())
  }

  /// Applies overrides from `lookup` (variable name → value).
  #[instrument(level = "trace", skip(self, lookup))]
  pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(raw) = lookup(ENV_STAGE_TIMEOUT_MS) {
      let ms = parse_usize(ENV_STAGE_TIMEOUT_MS, &raw, "milliseconds as an integer")?;
      self.stage_timeout = (ms > 0).then(|| Duration::from_millis(ms as u64));
    }
    if let Some(raw) = lookup(ENV_MAX_CONCURRENCY) {
      let n = parse_usize(ENV_MAX_CONCURRENCY, &raw, "a positive integer")?;
      if n == 0 {
        return Err(invalid(ENV_MAX_CONCURRENCY, &raw, "a positive integer"));
      }
      self.max_concurrency = Some(n);
    }
    if let Some(raw) = lookup(ENV_MAX_ITEMS) {
      self.max_items = Some(parse_usize(ENV_MAX_ITEMS, &raw, "an integer")?);
    }
    if let Some(raw) = lookup(ENV_DEDUPE) {
      self.dedupe_by_id = parse_bool(ENV_DEDUPE, &raw)?;
    }
    Ok(self)
  }
}

fn invalid(var: &'static str, value: &str, expected: &'static str) -> ConfigError {
  ConfigError::InvalidValue {
    var,
    value: value.to_string(),
    expected,
  }
}

fn parse_usize(var: &'static str, raw: &str, expected: &'static str) -> Result<usize, ConfigError> {
  raw.trim().parse().map_err(|_| invalid(var, raw, expected))
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
  match raw.trim().to_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" => Ok(false),
    _ => Err(invalid(var, raw, "a boolean")),
  }
}

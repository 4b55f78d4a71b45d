//! Error types.
//!
//! Item-scoped faults are captured into `StageResult`s and never escape a pipeline;
//! `BatchFault` is the only run-level failure and is reported inside `RunResult`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fault raised by (or around) one collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
  /// The external call itself errored (network, provider error, ...).
  #[error("collaborator call failed: {0}")]
  Call(String),
  /// The call returned, but the response could not be used.
  #[error("malformed response: {0}")]
  Malformed(String),
  #[error("timed out after {}ms", .0.as_millis())]
  Timeout(Duration),
  #[error("collaborator panicked: {0}")]
  Panicked(String),
}

impl StageError {
  pub fn call(msg: impl Into<String>) -> Self {
    StageError::Call(msg.into())
  }

  pub fn malformed(msg: impl Into<String>) -> Self {
    StageError::Malformed(msg.into())
  }
}

/// The batch stage failed; nothing was fanned out.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("batch stage '{stage_name}' failed: {error}")]
pub struct BatchFault {
  pub stage_name: String,
  pub error: String,
}

/// Invalid threshold text such as `"score ~ 70"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdParseError {
  #[error("expected '<field> <op> <number>', got '{0}'")]
  Syntax(String),
  #[error("unsupported comparator '{0}' (expected >, >=, < or <=)")]
  Comparator(String),
  #[error("cutoff '{0}' is not a finite number")]
  Cutoff(String),
}

/// Invalid configuration value from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  #[error("{var}: expected {expected}, got '{value}'")]
  InvalidValue {
    var: &'static str,
    value: String,
    expected: &'static str,
  },
}

/// Failure saving or loading a run report.
#[derive(Debug, Error)]
pub enum RunReportError {
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error("invalid run report JSON: {0}")]
  Json(#[from] serde_json::Error),
}

//! One entry of an item stage sequence: the stage, its optional gate and call policy.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::collaborator::ItemStage;
use crate::types::ThresholdSpec;

/// A stage in an item pipeline plus the gate checked after it.
#[derive(Clone)]
pub struct StageSpec {
  pub stage: Arc<dyn ItemStage>,
  /// Checked against the item with this stage's payload merged in.
  pub gate: Option<ThresholdSpec>,
  /// Invoked once, with the same item, when `stage` fails.
  pub fallback: Option<Arc<dyn ItemStage>>,
  /// Overrides the run-wide stage timeout for this stage (and its fallback).
  pub timeout: Option<Duration>,
}

impl StageSpec {
  pub fn new(stage: impl ItemStage + 'static) -> Self {
    Self::from_arc(Arc::new(stage))
  }

  pub fn from_arc(stage: Arc<dyn ItemStage>) -> Self {
    Self {
      stage,
      gate: None,
      fallback: None,
      timeout: None,
    }
  }

  pub fn gated(mut self, gate: ThresholdSpec) -> Self {
    self.gate = Some(gate);
    self
  }

  pub fn with_fallback(mut self, fallback: impl ItemStage + 'static) -> Self {
    self.fallback = Some(Arc::new(fallback));
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  pub fn name(&self) -> &str {
    self.stage.name()
  }
}

impl fmt::Debug for StageSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StageSpec")
      .field("stage", &self.stage.name())
      .field("gate", &self.gate)
      .field("fallback", &self.fallback.as_ref().map(|s| s.name().to_string()))
      .field("timeout", &self.timeout)
      .finish()
  }
}

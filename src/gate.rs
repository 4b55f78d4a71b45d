//! Threshold gate: pure continue/skip decision on a numeric attribute.

use tracing::instrument;

use crate::types::{Item, ThresholdSpec};

/// Decision of a gate for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
  Continue,
  Skip,
}

impl GateDecision {
  pub fn passed(self) -> bool {
    self == GateDecision::Continue
  }
}

/// Compares `item[spec.field]` against the cutoff. A missing or non-numeric field skips.
#[instrument(level = "trace", skip(item), fields(item_id = %item.id))]
pub fn evaluate(item: &Item, spec: &ThresholdSpec) -> GateDecision {
  match item.number(&spec.field) {
    Some(value) if spec.comparator.holds(value, spec.cutoff) => GateDecision::Continue,
    _ => GateDecision::Skip,
  }
}

/// Splits `items` into (passed, rejected), preserving order within each side.
pub fn partition(items: Vec<Item>, spec: &ThresholdSpec) -> (Vec<Item>, Vec<Item>) {
  items
    .into_iter()
    .partition(|item| evaluate(item, spec).passed())
}

/// Human-readable reason for a rejection, for the execution log.
pub fn rejection_detail(item: &Item, spec: &ThresholdSpec) -> String {
  match item.get(&spec.field) {
    Some(value) => format!("gate '{}' rejected {}={}", spec, spec.field, value),
    None => format!("gate '{}' rejected: '{}' missing", spec, spec.field),
  }
}

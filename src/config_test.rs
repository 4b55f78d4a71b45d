//! Tests for `PipelineConfig`.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;

use crate::config::{
  ENV_DEDUPE, ENV_MAX_CONCURRENCY, ENV_MAX_ITEMS, ENV_STAGE_TIMEOUT_MS, PipelineConfig,
};
use crate::error::ConfigError;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
  let map: HashMap<String, String> = vars
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
  move |k| map.get(k).cloned()
}

#[test]
fn new_has_no_limits() {
  let c = PipelineConfig::new("content");
  assert_eq!(c.pipeline_name, "content");
  assert_eq!(c.stage_timeout, None);
  assert_eq!(c.max_concurrency, None);
  assert_eq!(c.max_items, None);
  assert!(!c.dedupe_by_id);
  assert!(c.params.is_empty());
}

#[test]
fn builders_set_fields() {
  let c = PipelineConfig::new("recruiting")
    .with_stage_timeout(Duration::from_secs(30))
    .with_max_concurrency(4)
    .with_max_items(5)
    .with_dedupe_by_id(true)
    .with_param("sender", "Managing Partner");
  assert_eq!(c.stage_timeout, Some(Duration::from_secs(30)));
  assert_eq!(c.max_concurrency, Some(4));
  assert_eq!(c.max_items, Some(5));
  assert!(c.dedupe_by_id);
  assert_eq!(c.params.get("sender"), Some(&json!("Managing Partner")));
}

#[test]
fn zero_concurrency_is_raised_to_one() {
  let c = PipelineConfig::new("p").with_max_concurrency(0);
  assert_eq!(c.max_concurrency, Some(1));
}

#[test]
fn overrides_replace_builder_values() {
  let c = PipelineConfig::new("p")
    .with_max_concurrency(8)
    .with_overrides(lookup(&[
      (ENV_STAGE_TIMEOUT_MS, "2500"),
      (ENV_MAX_CONCURRENCY, "2"),
      (ENV_MAX_ITEMS, "3"),
      (ENV_DEDUPE, "yes"),
    ]))
    .unwrap();
  assert_eq!(c.stage_timeout, Some(Duration::from_millis(2500)));
  assert_eq!(c.max_concurrency, Some(2));
  assert_eq!(c.max_items, Some(3));
  assert!(c.dedupe_by_id);
}

#[test]
fn zero_timeout_disables_it() {
  let c = PipelineConfig::new("p")
    .with_stage_timeout(Duration::from_secs(1))
    .with_overrides(lookup(&[(ENV_STAGE_TIMEOUT_MS, "0")]))
    .unwrap();
  assert_eq!(c.stage_timeout, None);
}

#[test]
fn missing_vars_keep_values() {
  let c = PipelineConfig::new("p")
    .with_max_items(7)
    .with_overrides(lookup(&[]))
    .unwrap();
  assert_eq!(c.max_items, Some(7));
}

#[test]
fn invalid_values_are_errors() {
  let err = PipelineConfig::new("p")
    .with_overrides(lookup(&[(ENV_MAX_CONCURRENCY, "0")]))
    .unwrap_err();
  assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == ENV_MAX_CONCURRENCY));

  assert!(
    PipelineConfig::new("p")
      .with_overrides(lookup(&[(ENV_STAGE_TIMEOUT_MS, "soon")]))
      .is_err()
  );
  assert!(
    PipelineConfig::new("p")
      .with_overrides(lookup(&[(ENV_DEDUPE, "maybe")]))
      .is_err()
  );
}

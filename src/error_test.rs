//! Tests for error display.

use std::time::Duration;

use crate::error::{BatchFault, ConfigError, StageError};

#[test]
fn stage_error_messages_distinguish_call_from_malformed() {
  assert_eq!(
    StageError::call("503 from provider").to_string(),
    "collaborator call failed: 503 from provider"
  );
  assert_eq!(
    StageError::malformed("no JSON object").to_string(),
    "malformed response: no JSON object"
  );
}

#[test]
fn timeout_message_in_millis() {
  assert_eq!(
    StageError::Timeout(Duration::from_millis(1500)).to_string(),
    "timed out after 1500ms"
  );
}

#[test]
fn batch_fault_message() {
  let fault = BatchFault {
    stage_name: "signal_hunter".to_string(),
    error: "search quota exhausted".to_string(),
  };
  assert_eq!(
    fault.to_string(),
    "batch stage 'signal_hunter' failed: search quota exhausted"
  );
}

#[test]
fn config_error_names_variable() {
  let err = ConfigError::InvalidValue {
    var: "AGENT_CHAIN_MAX_CONCURRENCY",
    value: "lots".to_string(),
    expected: "a positive integer",
  };
  assert_eq!(
    err.to_string(),
    "AGENT_CHAIN_MAX_CONCURRENCY: expected a positive integer, got 'lots'"
  );
}

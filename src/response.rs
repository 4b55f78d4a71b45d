//! Strict parsing of free-text collaborator responses.
//!
//! Text-generation collaborators often wrap structured data in a fenced code block.
//! These helpers recover it and check its shape; anything unexpected is a
//! [StageError::Malformed], never a default value.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::instrument;

use crate::error::StageError;
use crate::types::{Attributes, Item};

const FENCE: &str = "```";

fn fenced_block() -> &'static Regex {
  static P: OnceLock<Regex> = OnceLock::new();
  P.get_or_init(|| {
    Regex::new(r"(?s)```[ \t]*(?:json|JSON)?[ \t]*\r?\n?(.*?)```").expect("static fence pattern")
  })
}

/// Returns the body of the first fenced block, or the whole trimmed text when there is none.
pub fn extract_json_text(text: &str) -> Result<&str, StageError> {
  if let Some(caps) = fenced_block().captures(text) {
    return Ok(caps.get(1).map_or("", |m| m.as_str()).trim());
  }
  if text.contains(FENCE) {
    return Err(StageError::malformed("unterminated code fence"));
  }
  Ok(text.trim())
}

/// Parses a JSON value out of `text` (see [extract_json_text]).
pub fn parse_json(text: &str) -> Result<Value, StageError> {
  let body = extract_json_text(text)?;
  if body.is_empty() {
    return Err(StageError::malformed("empty response"));
  }
  serde_json::from_str(body).map_err(|e| StageError::malformed(format!("invalid JSON: {}", e)))
}

/// Parses an item-stage response: must be a single JSON object.
#[instrument(level = "trace", skip(text))]
pub fn parse_attributes(text: &str) -> Result<Attributes, StageError> {
  match parse_json(text)? {
    Value::Object(map) => Ok(map),
    other => Err(StageError::malformed(format!(
      "expected a JSON object, got {}",
      kind(&other)
    ))),
  }
}

/// Parses a batch-stage response: a JSON array of objects, each with an `id_field`
/// holding a string or integer identity.
#[instrument(level = "trace", skip(text))]
pub fn parse_items(text: &str, id_field: &str) -> Result<Vec<Item>, StageError> {
  let entries = match parse_json(text)? {
    Value::Array(entries) => entries,
    other => {
      return Err(StageError::malformed(format!(
        "expected a JSON array, got {}",
        kind(&other)
      )));
    }
  };
  entries
    .into_iter()
    .enumerate()
    .map(|(i, entry)| item_from_value(i, entry, id_field))
    .collect()
}

fn item_from_value(index: usize, entry: Value, id_field: &str) -> Result<Item, StageError> {
  let Value::Object(attributes) = entry else {
    return Err(StageError::malformed(format!(
      "entry {} is {}, expected an object",
      index,
      kind(&entry)
    )));
  };
  let id = match attributes.get(id_field) {
    Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
    Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
    Some(other) => {
      return Err(StageError::malformed(format!(
        "entry {}: '{}' is {}, expected a non-empty string or integer",
        index,
        id_field,
        kind(other)
      )));
    }
    None => {
      return Err(StageError::malformed(format!(
        "entry {}: missing '{}'",
        index, id_field
      )));
    }
  };
  Ok(Item { id, attributes })
}

fn kind(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

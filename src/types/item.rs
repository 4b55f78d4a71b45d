//! A unit of work flowing through the item stages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Attributes;

/// One candidate produced by the batch stage: an identity plus the attributes
/// accumulated by the stages that succeeded on it so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
  pub id: String,
  #[serde(default)]
  pub attributes: Attributes,
}

impl Item {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      attributes: Attributes::new(),
    }
  }

  /// Builder-style attribute setter.
  pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.attributes.insert(key.into(), value.into());
    self
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.attributes.get(key)
  }

  /// Numeric view of an attribute. Strings, booleans and missing keys yield `None`.
  pub fn number(&self, key: &str) -> Option<f64> {
    self.attributes.get(key).and_then(Value::as_f64)
  }

  /// Overwrites attributes with the keys in `partial`.
  pub fn merge(&mut self, partial: &Attributes) {
    for (k, v) in partial {
      self.attributes.insert(k.clone(), v.clone());
    }
  }

  /// Copy of this item with `partial` merged in; `self` is untouched.
  pub fn merged(&self, partial: &Attributes) -> Item {
    let mut next = self.clone();
    next.merge(partial);
    next
  }
}

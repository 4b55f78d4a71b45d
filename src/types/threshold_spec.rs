//! Numeric threshold attached to a stage (e.g. `score > 70`).

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ThresholdParseError;

/// Comparison applied between an attribute value and the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
  #[serde(rename = ">")]
  Gt,
  #[serde(rename = ">=")]
  Ge,
  #[serde(rename = "<")]
  Lt,
  #[serde(rename = "<=")]
  Le,
}

impl Comparator {
  /// `value <op> cutoff`. Any NaN operand compares false.
  pub fn holds(self, value: f64, cutoff: f64) -> bool {
    match self {
      Comparator::Gt => value > cutoff,
      Comparator::Ge => value >= cutoff,
      Comparator::Lt => value < cutoff,
      Comparator::Le => value <= cutoff,
    }
  }

  fn symbol(self) -> &'static str {
    match self {
      Comparator::Gt => ">",
      Comparator::Ge => ">=",
      Comparator::Lt => "<",
      Comparator::Le => "<=",
    }
  }
}

impl fmt::Display for Comparator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.symbol())
  }
}

impl FromStr for Comparator {
  type Err = ThresholdParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      ">" => Ok(Comparator::Gt),
      ">=" => Ok(Comparator::Ge),
      "<" => Ok(Comparator::Lt),
      "<=" => Ok(Comparator::Le),
      other => Err(ThresholdParseError::Comparator(other.to_string())),
    }
  }
}

/// Gate definition: `field comparator cutoff`, evaluated against a numeric attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSpec {
  pub field: String,
  pub cutoff: f64,
  pub comparator: Comparator,
}

impl ThresholdSpec {
  pub fn new(field: impl Into<String>, comparator: Comparator, cutoff: f64) -> Self {
    Self {
      field: field.into(),
      cutoff,
      comparator,
    }
  }

  pub fn gt(field: impl Into<String>, cutoff: f64) -> Self {
    Self::new(field, Comparator::Gt, cutoff)
  }

  pub fn ge(field: impl Into<String>, cutoff: f64) -> Self {
    Self::new(field, Comparator::Ge, cutoff)
  }

  pub fn lt(field: impl Into<String>, cutoff: f64) -> Self {
    Self::new(field, Comparator::Lt, cutoff)
  }

  pub fn le(field: impl Into<String>, cutoff: f64) -> Self {
    Self::new(field, Comparator::Le, cutoff)
  }
}

impl fmt::Display for ThresholdSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} {}", self.field, self.comparator, self.cutoff)
  }
}

fn threshold_pattern() -> &'static Regex {
  static P: OnceLock<Regex> = OnceLock::new();
  P.get_or_init(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_.]*)\s*(>=|<=|>|<|=>|=<|==|!=|=)\s*(\S+)\s*$")
      .expect("static threshold pattern")
  })
}

impl FromStr for ThresholdSpec {
  type Err = ThresholdParseError;

  /// Parses `"score > 70"`, `"revenue>=200000"`, etc.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let caps = threshold_pattern()
      .captures(s)
      .ok_or_else(|| ThresholdParseError::Syntax(s.to_string()))?;
    let comparator: Comparator = caps[2].parse()?;
    let cutoff: f64 = caps[3]
      .parse()
      .map_err(|_| ThresholdParseError::Cutoff(caps[3].to_string()))?;
    if !cutoff.is_finite() {
      return Err(ThresholdParseError::Cutoff(caps[3].to_string()));
    }
    Ok(Self::new(&caps[1], comparator, cutoff))
  }
}

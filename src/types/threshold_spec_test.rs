//! Tests for `ThresholdSpec` and `Comparator`.

use super::{Comparator, ThresholdSpec};
use crate::error::ThresholdParseError;

#[test]
fn comparator_holds() {
  assert!(Comparator::Gt.holds(71.0, 70.0));
  assert!(!Comparator::Gt.holds(70.0, 70.0));
  assert!(Comparator::Ge.holds(70.0, 70.0));
  assert!(Comparator::Lt.holds(1.0, 2.0));
  assert!(!Comparator::Lt.holds(2.0, 2.0));
  assert!(Comparator::Le.holds(2.0, 2.0));
}

#[test]
fn comparator_nan_never_holds() {
  for c in [Comparator::Gt, Comparator::Ge, Comparator::Lt, Comparator::Le] {
    assert!(!c.holds(f64::NAN, 1.0));
    assert!(!c.holds(1.0, f64::NAN));
  }
}

#[test]
fn parse_with_spaces() {
  let spec: ThresholdSpec = "score > 70".parse().unwrap();
  assert_eq!(spec, ThresholdSpec::gt("score", 70.0));
}

#[test]
fn parse_without_spaces_and_float_cutoff() {
  let spec: ThresholdSpec = "portable_revenue>=200000.5".parse().unwrap();
  assert_eq!(spec.field, "portable_revenue");
  assert_eq!(spec.comparator, Comparator::Ge);
  assert_eq!(spec.cutoff, 200000.5);
}

#[test]
fn parse_rejects_equality_comparators() {
  let err = "score == 70".parse::<ThresholdSpec>().unwrap_err();
  assert!(matches!(err, ThresholdParseError::Comparator(ref c) if c == "=="));
  assert!("score != 70".parse::<ThresholdSpec>().is_err());
}

#[test]
fn parse_rejects_bad_cutoff() {
  let err = "score > high".parse::<ThresholdSpec>().unwrap_err();
  assert!(matches!(err, ThresholdParseError::Cutoff(_)));
  assert!("score > inf".parse::<ThresholdSpec>().is_err());
}

#[test]
fn parse_rejects_garbage() {
  let err = "just words".parse::<ThresholdSpec>().unwrap_err();
  assert!(matches!(err, ThresholdParseError::Syntax(_)));
}

#[test]
fn display_roundtrips_through_parse() {
  let spec = ThresholdSpec::le("risk", 0.25);
  let back: ThresholdSpec = spec.to_string().parse().unwrap();
  assert_eq!(back, spec);
}

#[test]
fn comparator_serializes_as_symbol() {
  let v = serde_json::to_value(ThresholdSpec::gt("score", 70.0)).unwrap();
  assert_eq!(v["comparator"], ">");
  assert_eq!(v["field"], "score");
}

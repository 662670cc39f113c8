/*!
Comparators.

Six of the eleven comparators are answered by one ternary [`compare`]: equal text
wins outright, otherwise both sides are compared as numbers when both parse, and
anything else is [`Comparison::Incomparable`], which only `is`/`isNot` treat as a
definite answer.
*/

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::a11y::Value;
use crate::types::AttaError;

/// Comparison operator of an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Comparator {
  Exists,
  Is,
  IsNot,
  Contains,
  DoesNotContain,
  IsLt,
  IsLte,
  IsGt,
  IsGte,
  IsType,
  IsAny,
}

/// Result of [`compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Comparison {
  Less,
  Equal,
  Greater,
  Incomparable,
}

/// Numeric-aware ternary comparison of an actual value against harness text.
pub fn compare(actual: &Value, expected: &str) -> Comparison {
  if actual.text_eq(expected) {
    return Comparison::Equal;
  }
  let (Some(a), Ok(b)) = (actual.as_f64(), expected.trim().parse::<f64>()) else {
    return Comparison::Incomparable;
  };
  match a.partial_cmp(&b) {
    Some(Ordering::Less) => Comparison::Less,
    Some(Ordering::Equal) => Comparison::Equal,
    Some(Ordering::Greater) => Comparison::Greater,
    None => Comparison::Incomparable,
  }
}

/// Expected value of an assertion.
///
/// A `[a,b,c]` literal also yields the alternatives `a`, `b`, `c` (trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expected {
  text: String,
  alternatives: Option<Vec<String>>,
}

impl Expected {
  /// Parse the harness text, splitting bracket literals into alternatives.
  pub fn parse(raw: &str) -> Self {
    let alternatives = raw
      .strip_prefix('[')
      .and_then(|rest| rest.strip_suffix(']'))
      .map(|inner| {
        inner
          .split(',')
          .map(|item| item.trim().to_owned())
          .collect()
      });
    Self {
      text: raw.to_owned(),
      alternatives,
    }
  }

  /// Expected text as sent by the harness.
  pub fn text(&self) -> &str {
    &self.text
  }

  /// Items of a bracket literal, if the text was one.
  pub fn alternatives(&self) -> Option<&[String]> {
    self.alternatives.as_deref()
  }

  /// Item-wise equality with a list value (`states is [A,B]`).
  fn matches_list(&self, actual: &Value) -> bool {
    match (self.alternatives(), actual.as_list()) {
      (Some(expected), Some(items)) => {
        expected.len() == items.len()
          && expected.iter().zip(items).all(|(e, item)| item.text_eq(e))
      }
      _ => false,
    }
  }
}

impl fmt::Display for Expected {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.text)
  }
}

impl Comparator {
  /// Harness spelling.
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Exists => "exists",
      Self::Is => "is",
      Self::IsNot => "isNot",
      Self::Contains => "contains",
      Self::DoesNotContain => "doesNotContain",
      Self::IsLt => "isLT",
      Self::IsLte => "isLTE",
      Self::IsGt => "isGT",
      Self::IsGte => "isGTE",
      Self::IsType => "isType",
      Self::IsAny => "isAny",
    }
  }

  /// The value this comparator actually inspects. `isType` looks at the type name.
  pub fn project(self, actual: Value) -> Value {
    match self {
      Self::IsType => Value::String(actual.type_name().to_owned()),
      _ => actual,
    }
  }

  /// Apply the comparator. `exists` says whether the subject resolved to something.
  pub fn evaluate(self, actual: &Value, exists: bool, expected: &Expected) -> bool {
    let text = expected.text();
    match self {
      Self::Exists => match text.to_ascii_lowercase().as_str() {
        "true" => exists,
        "false" => !exists,
        _ => actual.text_eq(text),
      },
      Self::Is => compare(actual, text) == Comparison::Equal || expected.matches_list(actual),
      Self::IsNot => !Self::Is.evaluate(actual, exists, expected),
      Self::Contains => actual.is_present() && actual.contains_text(text),
      Self::DoesNotContain => actual.is_list() && !actual.contains_text(text),
      Self::IsLt => compare(actual, text) == Comparison::Less,
      Self::IsLte => matches!(compare(actual, text), Comparison::Less | Comparison::Equal),
      Self::IsGt => compare(actual, text) == Comparison::Greater,
      Self::IsGte => matches!(compare(actual, text), Comparison::Greater | Comparison::Equal),
      Self::IsType => actual.text_eq(text),
      Self::IsAny => match expected.alternatives() {
        Some(alternatives) => alternatives.iter().any(|alt| actual.text_eq(alt)),
        None => actual.text_eq(text),
      },
    }
  }
}

impl FromStr for Comparator {
  type Err = AttaError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "exists" => Self::Exists,
      "is" => Self::Is,
      "isNot" => Self::IsNot,
      "contains" => Self::Contains,
      "doesNotContain" => Self::DoesNotContain,
      "isLT" => Self::IsLt,
      "isLTE" => Self::IsLte,
      "isGT" => Self::IsGt,
      "isGTE" => Self::IsGte,
      "isType" => Self::IsType,
      "isAny" => Self::IsAny,
      other => return Err(AttaError::InvalidAssertion(other.to_owned())),
    })
  }
}

impl fmt::Display for Comparator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

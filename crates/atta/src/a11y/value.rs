/*!
Actual values.

Everything an assertion can observe - a property, a relation rendering, a method
return - is expressed as a [`Value`] so one comparison routine serves them all.
*/

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Textual form of a missing value. `<nil>` in property expectations normalizes to this.
pub(crate) const NULL_MARKER: &str = "None";

/// Typed value observed on an accessible element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
  #[default]
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  String(String),
  List(Vec<Value>),
  Map(BTreeMap<String, Value>),
}

/// Render a number without a trailing `.0` when it is integral.
#[allow(clippy::cast_possible_truncation)] // Intentional: integral values only
pub fn format_number(n: f64) -> String {
  if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
    format!("{}", n as i64)
  } else {
    n.to_string()
  }
}

impl Value {
  /// Numeric view used by the ordering comparators.
  ///
  /// Strings count when they parse as a float, matching how the harness sends
  /// every expected value as text.
  #[allow(clippy::cast_precision_loss)]
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Int(n) => Some(*n as f64),
      Self::Float(n) => Some(*n),
      Self::String(s) => s.trim().parse::<f64>().ok(),
      Self::Null | Self::Bool(_) | Self::List(_) | Self::Map(_) => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[Value]> {
    match self {
      Self::List(items) => Some(items),
      _ => None,
    }
  }

  pub const fn is_null(&self) -> bool {
    matches!(self, Self::Null)
  }

  pub const fn is_list(&self) -> bool {
    matches!(self, Self::List(_))
  }

  /// Scalars compare by text; lists and maps only by membership.
  pub const fn is_scalar(&self) -> bool {
    !matches!(self, Self::List(_) | Self::Map(_))
  }

  /// Whether the value is present and non-empty.
  pub fn is_present(&self) -> bool {
    match self {
      Self::Null => false,
      Self::String(s) => !s.is_empty(),
      Self::List(items) => !items.is_empty(),
      Self::Map(map) => !map.is_empty(),
      Self::Bool(_) | Self::Int(_) | Self::Float(_) => true,
    }
  }

  /// Harness-facing type name, compared by `isType`.
  pub const fn type_name(&self) -> &'static str {
    match self {
      Self::Null => "Undefined",
      Self::Bool(_) => "Boolean",
      Self::Int(_) | Self::Float(_) => "Number",
      Self::String(_) => "String",
      Self::List(_) => "List",
      Self::Map(_) => "Dictionary",
    }
  }

  /// Whether `needle` occurs in this value: substring for text, item for lists,
  /// key for maps. Never true for null or numbers.
  pub fn contains_text(&self, needle: &str) -> bool {
    match self {
      Self::String(s) => s.contains(needle),
      Self::List(items) => items.iter().any(|item| item.text_eq(needle)),
      Self::Map(map) => map.contains_key(needle),
      Self::Null | Self::Bool(_) | Self::Int(_) | Self::Float(_) => false,
    }
  }

  /// Scalar equality against harness text (`5.0` equals `"5"`, null equals `"None"`).
  pub fn text_eq(&self, text: &str) -> bool {
    self.is_scalar() && self.to_string() == text
  }

  /// Lift into JSON for dumps. Non-finite floats become their text form.
  pub fn to_json(&self) -> serde_json::Value {
    match self {
      Self::Null => serde_json::Value::Null,
      Self::Bool(b) => serde_json::Value::Bool(*b),
      Self::Int(n) => serde_json::Value::from(*n),
      Self::Float(n) => serde_json::Number::from_f64(*n)
        .map_or_else(|| serde_json::Value::String(n.to_string()), serde_json::Value::Number),
      Self::String(s) => serde_json::Value::String(s.clone()),
      Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
      Self::Map(map) => serde_json::Value::Object(
        map
          .iter()
          .map(|(k, v)| (k.clone(), v.to_json()))
          .collect(),
      ),
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Null => f.write_str(NULL_MARKER),
      Self::Bool(b) => write!(f, "{b}"),
      Self::Int(n) => write!(f, "{n}"),
      Self::Float(n) => f.write_str(&format_number(*n)),
      Self::String(s) => f.write_str(s),
      Self::List(items) => {
        f.write_str("[")?;
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{item}")?;
        }
        f.write_str("]")
      }
      Self::Map(map) => {
        f.write_str("{")?;
        for (i, (key, value)) in map.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
      }
    }
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Self::String(s)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Self::String(s.to_owned())
  }
}

impl From<f64> for Value {
  fn from(n: f64) -> Self {
    Self::Float(n)
  }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self {
    Self::Int(n)
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Self::Bool(b)
  }
}

impl From<Vec<String>> for Value {
  fn from(items: Vec<String>) -> Self {
    Self::List(items.into_iter().map(Self::String).collect())
  }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(value: Option<T>) -> Self {
    value.map_or(Self::Null, Into::into)
  }
}


#[cfg(test)]
mod proptests {
  use super::*;
  use proptest::prelude::*;

  proptest! {
    /// Integral floats render exactly like the integer they hold
    #[test]
    fn integral_floats_match_ints(n in -1_000_000i64..1_000_000) {
      #[allow(clippy::cast_precision_loss)]
      let f = n as f64;
      prop_assert_eq!(Value::Float(f).to_string(), Value::Int(n).to_string());
    }

    /// Any rendered number parses back to itself
    #[test]
    fn rendered_numbers_parse(n in any::<f64>().prop_filter("finite", |n| n.is_finite())) {
      let text = Value::Float(n).to_string();
      prop_assert_eq!(Value::from(text.as_str()).as_f64(), Some(n));
    }

    /// Strings are never confused with lists by membership
    #[test]
    fn string_contains_itself(s in ".*") {
      prop_assert!(Value::from(s.as_str()).contains_text(&s));
    }
  }
}

/*!
Method signatures for `result` assertions.

A `result` assertion names a platform method as a call expression
(`rowExtentAt(1, 2)`). The adapter resolves the name against the element's
supported signatures, then coerces each argument string by its parameter type.
*/

use super::Value;
use crate::types::{AttaError, AttaResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Native type a platform parameter is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
  Bool,
  Int,
  Float,
  String,
  List,
  Map,
}

impl ParamType {
  /// Coerce one argument string to a typed value.
  pub fn coerce(self, raw: &str) -> AttaResult<Value> {
    let raw = raw.trim();
    let invalid = || AttaError::InvalidArgument {
      value: raw.to_owned(),
      expected: self.to_string(),
    };

    match self {
      Self::Bool => match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(Value::Bool(true)),
        "false" | "0" => Ok(Value::Bool(false)),
        _ => Err(invalid()),
      },
      Self::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
      Self::Float => raw.parse::<f64>().map(Value::Float).map_err(|_| invalid()),
      Self::String => Ok(Value::String(raw.to_owned())),
      Self::List => match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(items) => Ok(Value::List(items)),
        Err(_) => Ok(Value::List(vec![Value::String(raw.to_owned())])),
      },
      Self::Map => serde_json::from_str::<BTreeMap<String, Value>>(raw)
        .map(Value::Map)
        .map_err(|_| invalid()),
    }
  }
}

impl fmt::Display for ParamType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Bool => "boolean",
      Self::Int => "int",
      Self::Float => "double",
      Self::String => "utf8",
      Self::List => "array",
      Self::Map => "ghash",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct MethodParam {
  pub name: String,
  #[serde(rename = "type")]
  pub ty: ParamType,
}

/// A callable platform method as advertised by an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
  /// Method name as written in `result` assertions.
  pub name: String,
  /// Input parameters, in call order.
  #[serde(default)]
  pub params: Vec<MethodParam>,
  #[serde(default)]
  pub deprecated: bool,
}

impl MethodSignature {
  /// Check the argument count and coerce every argument.
  pub fn coerce_args(&self, args: &[String]) -> AttaResult<Vec<Value>> {
    if args.len() != self.params.len() {
      return Err(AttaError::ArgumentCount {
        method: self.to_string(),
        expected: self.params.len(),
        got: args.len(),
      });
    }
    self
      .params
      .iter()
      .zip(args)
      .map(|(param, arg)| param.ty.coerce(arg))
      .collect()
  }
}

impl fmt::Display for MethodSignature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.deprecated {
      f.write_str("DEPRECATED: ")?;
    }
    write!(f, "{}(", self.name)?;
    for (i, param) in self.params.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{} {}", param.ty, param.name)?;
    }
    f.write_str(")")
  }
}

/// Split `name(a, b)` into the method name and its raw argument strings.
///
/// An expression without parentheses is a call with no arguments. Empty
/// arguments are dropped, so `name()` and `name` are equivalent.
pub fn parse_call(expression: &str) -> (String, Vec<String>) {
  let expression = expression.trim();
  let Some((name, rest)) = expression.split_once('(') else {
    return (expression.to_owned(), Vec::new());
  };
  let inner = rest.strip_suffix(')').unwrap_or(rest);
  let args = inner
    .split(',')
    .map(str::trim)
    .filter(|arg| !arg.is_empty())
    .map(str::to_owned)
    .collect();
  (name.trim().to_owned(), args)
}

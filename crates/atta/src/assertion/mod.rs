/*!
Assertions.

An assertion arrives as a 4-tuple `[class, subject, comparator, expected]`. Any
`TBD` in the tuple turns it into an informational dump of the element.

- `expectation.rs` - comparators and expected values
- `properties.rs` - property name to getter table
- `evaluate.rs` - resolving actual values and producing results
- `report.rs` - the human-readable log block
- `dump.rs` - `TBD` element dumps
*/

mod dump;
mod evaluate;
mod expectation;
mod properties;
mod report;

pub(crate) use evaluate::{Evaluation, Evaluator};
pub use expectation::{compare, Comparator, Comparison, Expected};
pub use properties::{PropertyGetter, PropertyTable};

use std::fmt;
use std::str::FromStr;

use crate::a11y::NULL_MARKER;
use crate::types::{AttaError, AttaResult};

const TBD: &str = "TBD";
const NIL: &str = "<nil>";

/// What an assertion inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssertionClass {
  /// A snapshot property (`role`, `states`, ...).
  Property,
  /// Targets of a relation type.
  Relation,
  /// Event types observed by the document since load.
  Event,
  /// Return value of a platform method call.
  Result,
  /// Informational dump of the element; never passes.
  Dump,
}

impl AssertionClass {
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Property => "property",
      Self::Relation => "relation",
      Self::Event => "event",
      Self::Result => "result",
      Self::Dump => TBD,
    }
  }
}

impl FromStr for AssertionClass {
  type Err = AttaError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "property" => Ok(Self::Property),
      "relation" => Ok(Self::Relation),
      "event" => Ok(Self::Event),
      "result" => Ok(Self::Result),
      TBD => Ok(Self::Dump),
      other => Err(AttaError::InvalidAssertion(other.to_owned())),
    }
  }
}

impl fmt::Display for AssertionClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A parsed assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
  class: AssertionClass,
  subject: String,
  comparator: Comparator,
  expected: Expected,
  text: String,
}

impl Assertion {
  /// Parse a harness tuple.
  ///
  /// `<nil>` expectations on properties become the null marker, so they match a
  /// missing value.
  pub fn parse(parts: &[String]) -> AttaResult<Self> {
    let text = parts.join(" ");

    if parts.iter().any(|part| part == TBD) {
      return Ok(Self {
        class: AssertionClass::Dump,
        subject: String::new(),
        comparator: Comparator::Exists,
        expected: Expected::parse(""),
        text,
      });
    }

    let [class, subject, comparator, expected] = parts else {
      return Err(AttaError::InvalidAssertion(text));
    };
    let invalid = |_| AttaError::InvalidAssertion(text.clone());
    let class: AssertionClass = class.parse().map_err(invalid)?;
    let comparator: Comparator = comparator.parse().map_err(invalid)?;

    let expected = if class == AssertionClass::Property && expected == NIL {
      Expected::parse(NULL_MARKER)
    } else {
      Expected::parse(expected)
    };

    Ok(Self {
      class,
      subject: subject.clone(),
      comparator,
      expected,
      text,
    })
  }

  /// Which kind of lookup the subject names.
  pub const fn class(&self) -> AssertionClass {
    self.class
  }

  /// Property name, relation name, or method call expression.
  pub fn subject(&self) -> &str {
    &self.subject
  }

  /// How the observed value is checked.
  pub const fn comparator(&self) -> Comparator {
    self.comparator
  }

  /// Expected value, already parsed for the comparator.
  pub const fn expected(&self) -> &Expected {
    &self.expected
  }

  /// The tuple joined by spaces, as logged and recorded in results.
  pub fn text(&self) -> &str {
    &self.text
  }
}

impl fmt::Display for Assertion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
  }

  #[test]
  fn parses_property_assertion() {
    let assertion = Assertion::parse(&parts(&["property", "role", "is", "PUSH_BUTTON"])).unwrap();
    assert_eq!(assertion.class(), AssertionClass::Property);
    assert_eq!(assertion.subject(), "role");
    assert_eq!(assertion.comparator(), Comparator::Is);
    assert_eq!(assertion.expected().text(), "PUSH_BUTTON");
    assert_eq!(assertion.text(), "property role is PUSH_BUTTON");
  }

  #[test]
  fn nil_is_normalized_for_properties_only() {
    let property = Assertion::parse(&parts(&["property", "accName", "is", "<nil>"])).unwrap();
    assert_eq!(property.expected().text(), "None");

    let result = Assertion::parse(&parts(&["result", "nRows()", "is", "<nil>"])).unwrap();
    assert_eq!(result.expected().text(), "<nil>");
  }

  #[test]
  fn tbd_anywhere_makes_a_dump() {
    let assertion = Assertion::parse(&parts(&["property", "TBD", "is", "x"])).unwrap();
    assert_eq!(assertion.class(), AssertionClass::Dump);
    assert_eq!(assertion.subject(), "");
  }

  #[test]
  fn malformed_tuples_are_invalid() {
    for bad in [
      parts(&["property", "role", "is"]),
      parts(&["attribute", "role", "is", "x"]),
      parts(&["property", "role", "equals", "x"]),
      parts(&[]),
    ] {
      let err = Assertion::parse(&bad).unwrap_err();
      assert_eq!(err, AttaError::InvalidAssertion(bad.join(" ")));
    }
  }
}

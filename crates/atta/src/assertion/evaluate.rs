/*!
Assertion evaluation.

Every failure while resolving an actual value (unknown property, unknown relation,
unsupported method, platform error) is caught here, recorded as a message and
reported as FAIL. Nothing propagates out of [`Evaluator::evaluate`].
*/

use super::{dump, report, Assertion, AssertionClass, PropertyTable};
use crate::a11y::{parse_call, RelationType, Value};
use crate::core::{IssueQuery, KnownIssues};
use crate::platform::PlatformAdapter;
use crate::types::{
  AccessibleDocument, AccessibleElement, AttaError, AttaResult, TestResult, TestStatus,
};

/// Everything one batch evaluates against. The document is captured once per batch.
pub(crate) struct Evaluator<'a, P: PlatformAdapter> {
  pub(crate) platform: &'a P,
  pub(crate) properties: &'a PropertyTable<P::Node>,
  pub(crate) document: &'a AccessibleDocument<P::Node>,
  pub(crate) known_issues: &'a dyn KnownIssues,
  /// Name of the pending test, consulted by known-issue rules.
  pub(crate) test_name: &'a str,
}

/// Outcome of one assertion, with what the session needs for bookkeeping.
#[derive(Debug, Clone)]
pub(crate) struct Evaluation {
  pub(crate) result: TestResult,
  /// Known-issue reference for a failure.
  pub(crate) bug: Option<String>,
  /// False when the tuple itself could not be parsed.
  pub(crate) valid: bool,
}

impl Evaluation {
  pub(crate) const fn status(&self) -> TestStatus {
    self.result.result
  }
}

/// Resolved subject of an assertion.
struct Observed {
  value: Value,
  /// Whether the subject resolved to something (drives `exists`).
  exists: bool,
}

impl<P: PlatformAdapter> Evaluator<'_, P> {
  /// Evaluate one harness tuple against `element`.
  pub(crate) fn evaluate(
    &self,
    element: &AccessibleElement<P::Node>,
    parts: &[String],
  ) -> Evaluation {
    let assertion = match Assertion::parse(parts) {
      Ok(assertion) => assertion,
      Err(e) => {
        let message = format!("ERROR: {e}");
        return Evaluation {
          result: TestResult {
            result: TestStatus::Fail,
            message: message.clone(),
            log: message,
          },
          bug: None,
          valid: false,
        };
      }
    };

    if assertion.class() == AssertionClass::Dump {
      return self.dump(element);
    }

    let mut messages = Vec::new();
    let expected = assertion.expected();
    let (actual, passed) = match self.resolve(element, &assertion) {
      Ok(observed) if assertion.class() == AssertionClass::Event => {
        let passed = observed.value.contains_text(expected.text());
        (observed.value, passed)
      }
      // No targets fails whatever the comparator.
      Ok(observed) if assertion.class() == AssertionClass::Relation && !observed.exists => {
        (observed.value, false)
      }
      Ok(observed) => {
        let comparator = assertion.comparator();
        let actual = comparator.project(observed.value);
        let passed = comparator.evaluate(&actual, observed.exists, expected);
        (actual, passed)
      }
      Err(e) => {
        messages.push(format!("ERROR: {e}"));
        (Value::Null, false)
      }
    };

    let status = if passed { TestStatus::Pass } else { TestStatus::Fail };
    let bug = if passed {
      None
    } else {
      self.known_issues.lookup(&IssueQuery {
        assertion: assertion.text(),
        expected: expected.text(),
        actual: &actual.to_string(),
        test_name: self.test_name,
      })
    };
    if let Some(bug) = &bug {
      messages.push(bug.clone());
    }

    Evaluation {
      result: TestResult {
        result: status,
        message: messages.join(" "),
        log: report::render(assertion.text(), status, &actual, &messages),
      },
      bug,
      valid: true,
    }
  }

  fn resolve(
    &self,
    element: &AccessibleElement<P::Node>,
    assertion: &Assertion,
  ) -> AttaResult<Observed> {
    let subject = assertion.subject();
    match assertion.class() {
      AssertionClass::Property => {
        let value = self.properties.value(element, subject)?;
        Ok(Observed {
          exists: !value.is_null(),
          value,
        })
      }
      AssertionClass::Relation => {
        let relation = RelationType::from_name(subject)
          .ok_or_else(|| AttaError::UnknownRelation(subject.to_owned()))?;
        let targets = self.platform.relation_targets(element.node(), relation)?;
        let names: Vec<String> = targets.iter().map(|t| self.platform.describe(t)).collect();
        Ok(Observed {
          exists: !targets.is_empty(),
          value: Value::String(format!("[{}]", names.join(" "))),
        })
      }
      AssertionClass::Event => {
        let observed = self.document.observed_events();
        Ok(Observed {
          exists: !observed.is_empty(),
          value: Value::from(observed.to_vec()),
        })
      }
      AssertionClass::Result => {
        let (name, args) = parse_call(subject);
        let node = element.node();
        let methods = self.platform.supported_methods(node)?;
        let method = methods
          .iter()
          .find(|m| m.name == name)
          .ok_or(AttaError::UnsupportedMethod(name))?;
        let args = method.coerce_args(&args)?;
        let value = self.platform.invoke(node, method, &args)?;
        Ok(Observed {
          exists: !value.is_null(),
          value,
        })
      }
      AssertionClass::Dump => Err(AttaError::Internal("dump has no actual value".into())),
    }
  }

  fn dump(&self, element: &AccessibleElement<P::Node>) -> Evaluation {
    let mut messages = Vec::new();
    let log = dump::render(self.platform, self.properties, element, &mut messages);
    Evaluation {
      result: TestResult {
        result: TestStatus::Fail,
        message: messages.join(" "),
        log,
      },
      bug: None,
      valid: true,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::a11y::{MethodParam, MethodSignature, ParamType};
  use crate::core::{IssueRule, IssueRules, NoKnownIssues};
  use crate::platform::{MemoryNode, MemoryPlatform, MethodSpec, NodeSpec};

  fn fixture() -> NodeSpec {
    let mut label = NodeSpec::with_id("lbl");
    label.attributes.role = "ROLE_SYSTEM_STATICTEXT".into();

    let mut button = NodeSpec::with_id("btn1");
    button.attributes.role = "PUSH_BUTTON".into();
    button.attributes.name = Some("OK".into());
    button.attributes.states = vec!["FOCUSABLE".into(), "FOCUSED".into()];
    button
      .relation_targets
      .insert("labelledBy".into(), vec!["lbl".into()]);
    button.methods = vec![MethodSpec {
      signature: MethodSignature {
        name: "cellAt".into(),
        params: vec![
          MethodParam {
            name: "row".into(),
            ty: ParamType::Int,
          },
          MethodParam {
            name: "column".into(),
            ty: ParamType::Int,
          },
        ],
        deprecated: false,
      },
      returns: Value::from("cell-1-2"),
    }];
    button.actions = vec!["press".into()];

    let mut root = NodeSpec::default();
    root.uri = Some("http://test/t1.html".into());
    root.children = vec![label, button];
    root
  }

  struct Harness {
    platform: MemoryPlatform,
    properties: PropertyTable<MemoryNode>,
    document: AccessibleDocument<MemoryNode>,
  }

  impl Harness {
    fn new() -> Self {
      let platform = MemoryPlatform::new();
      let root = platform.add_document(&fixture());
      let document = AccessibleDocument::build(&platform, root);
      Self {
        platform,
        properties: PropertyTable::standard(),
        document,
      }
    }

    fn run_with(&self, known_issues: &dyn KnownIssues, parts: &[&str]) -> Evaluation {
      let evaluator = Evaluator {
        platform: &self.platform,
        properties: &self.properties,
        document: &self.document,
        known_issues,
        test_name: "button-test",
      };
      let element = self.document.element("btn1").unwrap();
      let parts: Vec<String> = parts.iter().map(|s| (*s).to_owned()).collect();
      evaluator.evaluate(element, &parts)
    }

    fn run(&self, parts: &[&str]) -> Evaluation {
      self.run_with(&NoKnownIssues, parts)
    }
  }

  #[test]
  fn property_pass_and_fail() {
    let h = Harness::new();
    assert_eq!(h.run(&["property", "role", "is", "PUSH_BUTTON"]).status(), TestStatus::Pass);
    assert_eq!(h.run(&["property", "states", "contains", "FOCUSED"]).status(), TestStatus::Pass);
    assert_eq!(h.run(&["property", "accDescription", "is", "<nil>"]).status(), TestStatus::Pass);
    assert_eq!(h.run(&["property", "role", "is", "LINK"]).status(), TestStatus::Fail);
  }

  #[test]
  fn unknown_property_fails_with_message() {
    let h = Harness::new();
    let evaluation = h.run(&["property", "colour", "isNot", "red"]);
    assert_eq!(evaluation.status(), TestStatus::Fail);
    assert_eq!(evaluation.result.message, "ERROR: Unsupported property: colour");
    assert!(evaluation.valid);
  }

  #[test]
  fn relation_renders_bracketed_targets() {
    let h = Harness::new();
    let evaluation = h.run(&["relation", "labelledBy", "exists", "true"]);
    assert_eq!(evaluation.status(), TestStatus::Pass);
    assert!(evaluation.result.log.contains("ACTUAL VALUE: [lbl]"));

    assert_eq!(h.run(&["relation", "LABELLED_BY", "is", "[lbl]"]).status(), TestStatus::Pass);
    assert_eq!(h.run(&["relation", "describedBy", "exists", "true"]).status(), TestStatus::Fail);

    // An element with no targets for the relation fails every comparator.
    let empty = h.run(&["relation", "describedBy", "exists", "false"]);
    assert_eq!(empty.status(), TestStatus::Fail);
    assert!(empty.result.log.contains("ACTUAL VALUE: []"));
    assert_eq!(h.run(&["relation", "describedBy", "is", "[]"]).status(), TestStatus::Fail);
    assert_eq!(h.run(&["relation", "describedBy", "isNot", "[lbl]"]).status(), TestStatus::Fail);
    assert_eq!(h.run(&["relation", "bogus", "exists", "true"]).status(), TestStatus::Fail);
  }

  #[test]
  fn event_checks_observed_names() {
    let mut h = Harness::new();
    assert_eq!(h.run(&["event", "type", "is", "EVENT_OBJECT_FOCUS"]).status(), TestStatus::Fail);
    h.document.add_event("EVENT_OBJECT_FOCUS");
    assert_eq!(h.run(&["event", "type", "is", "EVENT_OBJECT_FOCUS"]).status(), TestStatus::Pass);
  }

  #[test]
  fn result_invokes_typed_method() {
    let h = Harness::new();
    assert_eq!(h.run(&["result", "cellAt(1, 2)", "is", "cell-1-2"]).status(), TestStatus::Pass);

    let wrong_count = h.run(&["result", "cellAt(1)", "is", "cell-1-2"]);
    assert_eq!(wrong_count.status(), TestStatus::Fail);
    assert!(wrong_count.result.message.contains("Incorrect argument count"));

    let bad_type = h.run(&["result", "cellAt(one, 2)", "is", "cell-1-2"]);
    assert_eq!(bad_type.status(), TestStatus::Fail);

    let missing = h.run(&["result", "nRows()", "is", "3"]);
    assert_eq!(missing.result.message, "ERROR: nRows is not supported");
  }

  #[test]
  fn invalid_tuple_is_reported_not_raised() {
    let h = Harness::new();
    let evaluation = h.run(&["attribute", "role", "is", "x"]);
    assert_eq!(evaluation.status(), TestStatus::Fail);
    assert!(!evaluation.valid);
    assert_eq!(
      evaluation.result.message,
      "ERROR: attribute role is x is not a valid assertion"
    );
  }

  #[test]
  fn dump_is_informational() {
    let h = Harness::new();
    let evaluation = h.run(&["TBD", "TBD", "TBD", "TBD"]);
    assert_eq!(evaluation.status(), TestStatus::Fail);

    let dump: serde_json::Value = serde_json::from_str(&evaluation.result.log).unwrap();
    assert_eq!(dump["properties"]["role"], "PUSH_BUTTON");
    assert_eq!(dump["relation targets"]["LABELLED_BY"], serde_json::json!(["lbl"]));
    assert_eq!(
      dump["supported methods"],
      serde_json::json!(["cellAt(int row, int column)"])
    );
    assert_eq!(dump["actions"], serde_json::json!(["press"]));
  }

  #[test]
  fn known_issue_is_attached_to_failures() {
    let h = Harness::new();
    let rules = IssueRules::new(vec![IssueRule {
      bug: "https://bugs.example/42".into(),
      assertion_contains: vec!["property role".into()],
      ..Default::default()
    }]);

    let failing = h.run_with(&rules, &["property", "role", "is", "LINK"]);
    assert_eq!(failing.status(), TestStatus::Fail);
    assert_eq!(failing.bug.as_deref(), Some("https://bugs.example/42"));
    assert_eq!(failing.result.message, "https://bugs.example/42");

    let passing = h.run_with(&rules, &["property", "role", "is", "PUSH_BUTTON"]);
    assert_eq!(passing.bug, None);
  }
}

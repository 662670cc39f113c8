/*!
Known-issue lookup.

When an assertion fails, the session asks a [`KnownIssues`] source whether the
failure is an already-reported defect. A hit reclassifies the failure for results
and log colouring; the status stays FAIL.
*/

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{AttaError, AttaResult};

/// What a failed assertion looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueQuery<'a> {
  /// Assertion tuple joined by spaces (`property role is ROLE_SYSTEM_PANE`).
  pub assertion: &'a str,
  pub expected: &'a str,
  /// Actual value as rendered in the log.
  pub actual: &'a str,
  /// Name of the pending test. Empty when no test is pending.
  pub test_name: &'a str,
}

/// Source of bug references for failures.
pub trait KnownIssues: Send + Sync {
  /// Bug reference for a failure, if it is a known issue.
  fn lookup(&self, query: &IssueQuery<'_>) -> Option<String>;
}

/// Treats every failure as new.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKnownIssues;

impl KnownIssues for NoKnownIssues {
  fn lookup(&self, _query: &IssueQuery<'_>) -> Option<String> {
    None
  }
}

/// One triage rule. Every condition that is set must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IssueRule {
  /// Reference reported for matching failures.
  pub bug: String,
  /// Substrings that must all occur in the assertion text.
  pub assertion_contains: Vec<String>,
  /// Substrings that must all occur in the test name.
  pub test_name_contains: Vec<String>,
  pub expected_prefix: Option<String>,
  pub expected_suffix: Option<String>,
  pub expected_contains: Option<String>,
  pub actual_suffix: Option<String>,
  /// The expected text must not occur in the actual value.
  pub expected_not_in_actual: bool,
}

impl IssueRule {
  /// Whether every condition set on this rule holds for `query`. Unset
  /// conditions match anything.
  pub fn matches(&self, query: &IssueQuery<'_>) -> bool {
    contains_all(query.assertion, &self.assertion_contains)
      && contains_all(query.test_name, &self.test_name_contains)
      && self
        .expected_prefix
        .as_deref()
        .map_or(true, |p| query.expected.starts_with(p))
      && self
        .expected_suffix
        .as_deref()
        .map_or(true, |s| query.expected.ends_with(s))
      && self
        .expected_contains
        .as_deref()
        .map_or(true, |s| query.expected.contains(s))
      && self
        .actual_suffix
        .as_deref()
        .map_or(true, |s| query.actual.ends_with(s))
      && (!self.expected_not_in_actual || !query.actual.contains(query.expected))
  }
}

fn contains_all(haystack: &str, needles: &[String]) -> bool {
  needles.iter().all(|needle| haystack.contains(needle.as_str()))
}

/// Ordered rule list, typically loaded from a JSON array. First match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueRules {
  rules: Vec<IssueRule>,
}

impl IssueRules {
  /// Rules in priority order.
  pub const fn new(rules: Vec<IssueRule>) -> Self {
    Self { rules }
  }

  /// Parse a JSON array of rules.
  pub fn from_json(json: &str) -> AttaResult<Self> {
    serde_json::from_str(json)
      .map_err(|e| AttaError::Config(format!("invalid known-issue rules: {e}")))
  }

  /// Read and parse a rule file.
  pub fn load(path: &Path) -> AttaResult<Self> {
    let json = std::fs::read_to_string(path)
      .map_err(|e| AttaError::Config(format!("cannot read {}: {e}", path.display())))?;
    Self::from_json(&json)
  }

  /// The rules, first match first.
  pub fn rules(&self) -> &[IssueRule] {
    &self.rules
  }

  /// Number of rules.
  pub fn len(&self) -> usize {
    self.rules.len()
  }

  /// Whether the list has no rules. An empty list matches no failure.
  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }
}

impl KnownIssues for IssueRules {
  fn lookup(&self, query: &IssueQuery<'_>) -> Option<String> {
    if query.test_name.is_empty() {
      return None;
    }
    self
      .rules
      .iter()
      .find(|rule| !rule.bug.is_empty() && rule.matches(query))
      .map(|rule| rule.bug.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const RULES: &str = r#"[
    {
      "bug": "https://bugzil.la/1355423",
      "assertionContains": ["property role"],
      "expectedSuffix": "TREE_ITEM",
      "actualSuffix": "LIST_ITEM"
    },
    {
      "bug": "https://bugzil.la/1355954",
      "assertionContains": ["property interfaces", "Value"],
      "testNameContains": ["separator"]
    },
    {
      "bug": "https://bugzil.la/1355447",
      "assertionContains": ["property states"],
      "expectedSuffix": "HAS_POPUP",
      "expectedNotInActual": true
    }
  ]"#;

  fn query<'a>(
    assertion: &'a str,
    expected: &'a str,
    actual: &'a str,
    test: &'a str,
  ) -> IssueQuery<'a> {
    IssueQuery {
      assertion,
      expected,
      actual,
      test_name: test,
    }
  }

  #[test]
  fn rules_load_from_json() {
    let rules = IssueRules::from_json(RULES).unwrap();
    assert_eq!(rules.len(), 3);
    assert!(IssueRules::from_json("{").is_err());
  }

  #[test]
  fn first_matching_rule_wins() {
    let rules = IssueRules::from_json(RULES).unwrap();
    let hit = rules.lookup(&query(
      "property role is ROLE_SYSTEM_OUTLINEITEM_TREE_ITEM",
      "ROLE_SYSTEM_OUTLINEITEM_TREE_ITEM",
      "ROLE_SYSTEM_LIST_ITEM",
      "treeitem-test",
    ));
    assert_eq!(hit.as_deref(), Some("https://bugzil.la/1355423"));
  }

  #[test]
  fn every_condition_must_hold() {
    let rules = IssueRules::from_json(RULES).unwrap();
    let wrong_test = query("property interfaces contains Value", "Value", "[]", "slider-test");
    assert_eq!(rules.lookup(&wrong_test), None);

    let right_test = query("property interfaces contains Value", "Value", "[]", "separator-focusable");
    assert_eq!(rules.lookup(&right_test).as_deref(), Some("https://bugzil.la/1355954"));
  }

  #[test]
  fn expected_not_in_actual() {
    let rules = IssueRules::from_json(RULES).unwrap();
    let absent = query("property states contains HAS_POPUP", "HAS_POPUP", "[FOCUSABLE]", "t");
    assert!(rules.lookup(&absent).is_some());
    let present = query("property states contains HAS_POPUP", "HAS_POPUP", "[HAS_POPUP]", "t");
    assert!(rules.lookup(&present).is_none());
  }

  #[test]
  fn no_pending_test_means_no_bug() {
    let rules = IssueRules::from_json(RULES).unwrap();
    let q = query("property role is TREE_ITEM", "TREE_ITEM", "LIST_ITEM", "");
    assert_eq!(rules.lookup(&q), None);
    assert_eq!(NoKnownIssues.lookup(&q), None);
  }
}

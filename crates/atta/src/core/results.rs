/*!
Results aggregation.

Every evaluated assertion is filed under its bug reference when it is a known
issue, otherwise under its status, then under the path of the test file.
*/

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::types::TestStatus;

/// Append-only record of a run: key (bug or status) to file path to assertions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultsTable {
  by_key: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl ResultsTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// File one assertion.
  pub fn record(&mut self, key: &str, file: &str, assertion: &str) {
    self
      .by_key
      .entry(key.to_owned())
      .or_default()
      .entry(file.to_owned())
      .or_default()
      .push(assertion.to_owned());
  }

  /// Assertions filed under `key`, by file.
  pub fn get(&self, key: &str) -> Option<&BTreeMap<String, Vec<String>>> {
    self.by_key.get(key)
  }

  /// Number of assertions filed under `key`.
  pub fn count(&self, key: &str) -> usize {
    self
      .by_key
      .get(key)
      .map_or(0, |files| files.values().map(Vec::len).sum())
  }

  /// Status names and bug URLs that have results, sorted.
  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.by_key.keys().map(String::as_str)
  }

  /// Whether nothing has been recorded yet.
  pub fn is_empty(&self) -> bool {
    self.by_key.is_empty()
  }

  /// Per-key and per-file assertion counts, one line each.
  pub fn summary(&self) -> String {
    let mut out = String::new();
    for (key, files) in &self.by_key {
      let _ = writeln!(out, "{key}: {}", self.count(key));
      for (file, assertions) in files {
        let _ = writeln!(out, "  {file}: {}", assertions.len());
      }
    }
    out
  }
}

/// Path component of a test URL; the whole string when it does not parse.
pub(crate) fn test_file(url: &str) -> String {
  url::Url::parse(url).map_or_else(|_| url.to_owned(), |parsed| parsed.path().to_owned())
}

/// Colour of a result line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tone {
  Plain,
  Good,
  Warning,
  Bad,
}

impl Tone {
  /// Green for PASS, yellow for a known issue, red for other failures and invalid tuples.
  pub(crate) fn for_result(ansi: bool, status: TestStatus, known_issue: bool, valid: bool) -> Self {
    if !ansi {
      return Self::Plain;
    }
    match status {
      TestStatus::Pass => Self::Good,
      _ if !valid => Self::Bad,
      TestStatus::Fail if known_issue => Self::Warning,
      TestStatus::Fail => Self::Bad,
      TestStatus::NotRun => Self::Warning,
    }
  }

  pub(crate) fn paint(self, text: &str) -> String {
    let colour = match self {
      Self::Plain => return text.to_owned(),
      Self::Good => 32,
      Self::Warning => 33,
      Self::Bad => 31,
    };
    format!("\x1b[{colour};1m\x1b[22m{text}\x1b[0m")
  }
}

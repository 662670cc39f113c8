/*! Structured results returned to the HTTP layer. */

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use super::AttaError;

/// Outcome of one assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TestStatus {
  #[serde(rename = "PASS")]
  Pass,
  #[serde(rename = "FAIL")]
  Fail,
  #[serde(rename = "NOT RUN")]
  NotRun,
}

impl TestStatus {
  /// Wire spelling.
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Pass => "PASS",
      Self::Fail => "FAIL",
      Self::NotRun => "NOT RUN",
    }
  }
}

impl fmt::Display for TestStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One entry of a `test` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TestResult {
  pub result: TestStatus,
  /// Diagnostics joined by spaces; includes the known-issue reference if any.
  pub message: String,
  /// Human-readable block (or JSON dump for informational assertions).
  pub log: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
#[allow(missing_docs)]
pub enum RunStatus {
  Ok,
  Error,
}

/// Result of running an assertion batch.
///
/// A refused batch (not enabled, not ready, element not found) carries the reason
/// in `message` and no results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RunOutcome {
  pub status: RunStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  pub results: Vec<TestResult>,
}

impl RunOutcome {
  /// Completed batch.
  pub const fn ok(results: Vec<TestResult>) -> Self {
    Self {
      status: RunStatus::Ok,
      message: None,
      results,
    }
  }

  /// Batch refused before any assertion ran.
  pub fn refused(error: &AttaError) -> Self {
    Self {
      status: RunStatus::Error,
      message: Some(error.status_message()),
      results: Vec::new(),
    }
  }
}

/// Result of announcing a test and waiting for its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
  /// The announced URL is loaded.
  Ready,
  /// Accessibility is not enabled; the test must be run manually.
  NotEnabled,
  /// The document did not load before the timeout.
  TimedOut,
}

/// Adapter identity merged into the `start` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdapterInfo {
  #[serde(rename = "ATTAname")]
  pub atta_name: String,
  #[serde(rename = "ATTAversion")]
  pub atta_version: String,
  #[serde(rename = "API")]
  pub api: String,
  #[serde(rename = "APIversion")]
  pub api_version: String,
}

/*! Error types for adapter operations. */

use crate::a11y::EventType;

/// Errors that can occur during adapter operations.
///
/// The first three variants are the session-level refusals the harness sees as
/// `status: ERROR`; the rest are caught per assertion or per traversal step.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttaError {
  #[error("ATTA not enabled")]
  NotEnabled,

  #[error("ATTA not ready")]
  NotReady,

  #[error("Element not found")]
  ElementNotFound,

  #[error("{0} is not a valid assertion")]
  InvalidAssertion(String),

  #[error("Unsupported property: {0}")]
  UnsupportedProperty(String),

  #[error("{0} is not supported")]
  UnsupportedMethod(String),

  #[error("Incorrect argument count for {method}: expected {expected}, got {got}")]
  ArgumentCount {
    method: String,
    expected: usize,
    got: usize,
  },

  #[error("Invalid argument '{value}' for parameter of type {expected}")]
  InvalidArgument { value: String, expected: String },

  #[error("Unknown relation type: {0}")]
  UnknownRelation(String),

  #[error("Unknown event type: {0}")]
  UnknownEventType(String),

  #[error("No name registered for event code {0}")]
  UnmappedEventCode(EventType),

  #[error("Node not found: {0}")]
  NodeNotFound(String),

  #[error("Platform call failed: {0}")]
  Platform(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl AttaError {
  /// Reason string reported to the harness alongside `status: ERROR`.
  pub fn status_message(&self) -> String {
    self.to_string()
  }
}

/// Result type for adapter operations.
pub type AttaResult<T> = Result<T, AttaError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn session_refusals_render_harness_reasons() {
    assert_eq!(AttaError::NotEnabled.to_string(), "ATTA not enabled");
    assert_eq!(AttaError::NotReady.to_string(), "ATTA not ready");
    assert_eq!(AttaError::ElementNotFound.to_string(), "Element not found");
    assert_eq!(AttaError::NotReady.status_message(), "ATTA not ready");
  }

  #[test]
  fn unsupported_method_message() {
    let err = AttaError::UnsupportedMethod("rowExtentAt".into());
    assert_eq!(err.to_string(), "rowExtentAt is not supported");
  }
}

/*!
Request parameters and response bodies.
*/

use atta::{AdapterInfo, RunOutcome};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

/// `statusText` when the adapter has no platform accessibility.
pub const NOT_ENABLED_TEXT: &str = "ENABLED ATTA NOT FOUND. TEST MUST BE RUN MANUALLY.";

/// `statusText` when the announced document never loads.
pub const TIMEOUT_TEXT: &str = "Timeout waiting for is_ready() to return True";

/// Value of `status` in control responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
#[allow(missing_docs)]
pub enum ControlStatus {
  Ready,
  Done,
  Error,
}

/// Body of `startlisten`, `stoplisten` and `end` responses, and of refused `start`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct StatusResponse {
  pub status: ControlStatus,
  #[serde(rename = "statusText")]
  pub status_text: String,
}

impl StatusResponse {
  pub const fn new(status: ControlStatus) -> Self {
    Self {
      status,
      status_text: String::new(),
    }
  }

  pub fn error(text: impl Into<String>) -> Self {
    Self {
      status: ControlStatus::Error,
      status_text: text.into(),
    }
  }
}

/// Body of a `start` response once the adapter has waited for the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct StartResponse {
  #[serde(flatten)]
  pub info: AdapterInfo,
  pub status: ControlStatus,
  #[serde(rename = "statusText")]
  pub status_text: String,
}

/// Body of a `test` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct TestResponse {
  #[serde(flatten)]
  pub outcome: RunOutcome,
  /// Parameter errors, reported only when no results came back.
  #[serde(rename = "statusText")]
  pub status_text: String,
}

/// Fields of a request body, with every problem found while reading them.
#[derive(Debug, Default)]
pub(crate) struct Params {
  fields: serde_json::Map<String, Value>,
  errors: Vec<String>,
}

impl Params {
  pub(crate) fn parse(body: &[u8]) -> Self {
    match serde_json::from_slice::<Value>(body) {
      Ok(Value::Object(fields)) => Self {
        fields,
        errors: Vec::new(),
      },
      Ok(other) => Self {
        fields: serde_json::Map::new(),
        errors: vec![format!("Request body is not a JSON object: {other}")],
      },
      Err(e) => Self {
        fields: serde_json::Map::new(),
        errors: vec![format!("Invalid JSON body: {e}")],
      },
    }
  }

  /// Remove and decode `name`. Missing, null or mistyped fields are recorded as errors.
  pub(crate) fn take<T: DeserializeOwned>(&mut self, name: &str) -> Option<T> {
    match self.fields.remove(name) {
      None | Some(Value::Null) => {
        self.errors.push(format!("Parameter {name} not found"));
        None
      }
      Some(value) => match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
          self.errors.push(format!("Parameter {name} is invalid: {e}"));
          None
        }
      },
    }
  }

  /// Every error so far, joined by `"; "`. Empty when there were none.
  pub(crate) fn error(&self) -> String {
    self.errors.join("; ")
  }
}

/// Assertion tuples as strings. Non-string members keep their JSON spelling.
pub(crate) fn assertion_parts(data: Vec<Vec<Value>>) -> Vec<Vec<String>> {
  data
    .into_iter()
    .map(|tuple| {
      tuple
        .into_iter()
        .map(|part| match part {
          Value::String(text) => text,
          other => other.to_string(),
        })
        .collect()
    })
    .collect()
}

/// Pretty JSON, four-space indent, keys sorted.
pub(crate) fn to_pretty_json<T: Serialize>(body: &T) -> serde_json::Result<String> {
  // Going through `Value` sorts object keys.
  let value = serde_json::to_value(body)?;
  let mut out = Vec::new();
  let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
  let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
  value.serialize(&mut serializer)?;
  Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
  use super::*;
  use atta::RunStatus;

  #[test]
  fn missing_params_are_listed_in_order() {
    let mut params = Params::parse(br#"{"url": "http://test/t1.html"}"#);
    assert_eq!(params.take::<String>("test"), None);
    assert_eq!(params.take::<String>("url").as_deref(), Some("http://test/t1.html"));
    assert_eq!(params.take::<String>("title"), None);
    assert_eq!(
      params.error(),
      "Parameter test not found; Parameter title not found"
    );
  }

  #[test]
  fn null_counts_as_missing() {
    let mut params = Params::parse(br#"{"id": null}"#);
    assert_eq!(params.take::<String>("id"), None);
    assert_eq!(params.error(), "Parameter id not found");
  }

  #[test]
  fn unreadable_body_is_reported_first() {
    let mut params = Params::parse(b"");
    assert_eq!(params.take::<String>("test"), None);
    let error = params.error();
    assert!(error.starts_with("Invalid JSON body"));
    assert!(error.ends_with("; Parameter test not found"));
  }

  #[test]
  fn mistyped_params_are_errors() {
    let mut params = Params::parse(br#"{"events": "EVENT_OBJECT_FOCUS"}"#);
    assert_eq!(params.take::<Vec<String>>("events"), None);
    assert!(params.error().starts_with("Parameter events is invalid"));
  }

  #[test]
  fn assertion_members_become_strings() {
    let data = serde_json::from_str(r#"[["property", "columnExtent", "is", 2], ["TBD"]]"#).unwrap();
    assert_eq!(
      assertion_parts(data),
      vec![
        vec!["property", "columnExtent", "is", "2"],
        vec!["TBD"],
      ]
    );
  }

  #[test]
  fn responses_are_pretty_with_sorted_keys() {
    let body = TestResponse {
      outcome: RunOutcome {
        status: RunStatus::Ok,
        message: None,
        results: Vec::new(),
      },
      status_text: String::new(),
    };
    let text = to_pretty_json(&body).unwrap();
    assert_eq!(
      text,
      "{\n    \"results\": [],\n    \"status\": \"OK\",\n    \"statusText\": \"\"\n}"
    );
  }

  #[test]
  fn start_response_carries_adapter_identity() {
    let body = StartResponse {
      info: AdapterInfo {
        atta_name: "ATTA for IA2".into(),
        atta_version: "0.1.0".into(),
        api: "IAccessible2".into(),
        api_version: "1.3".into(),
      },
      status: ControlStatus::Ready,
      status_text: String::new(),
    };
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["ATTAname"], "ATTA for IA2");
    assert_eq!(value["API"], "IAccessible2");
    assert_eq!(value["status"], "READY");
  }
}

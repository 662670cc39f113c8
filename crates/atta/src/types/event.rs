/*! Platform event payloads. */

use crate::a11y::{EventType, Value};

/// Payload delivered to listener callbacks.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct PlatformEvent<N> {
  /// Node the event was raised on.
  pub source: N,
  pub event_type: EventType,
  pub detail1: i64,
  pub detail2: i64,
  /// Event-specific extra data (e.g. inserted text). Null when absent.
  pub aux_data: Value,
}

impl<N> PlatformEvent<N> {
  /// Event with zeroed details and no extra data.
  pub const fn new(source: N, event_type: EventType) -> Self {
    Self {
      source,
      event_type,
      detail1: 0,
      detail2: 0,
      aux_data: Value::Null,
    }
  }
}

/// An event kept in the session history for event assertions.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct EventRecord<N> {
  pub source: N,
  pub event_type: EventType,
  /// Symbolic name, or the hex code when the table has no entry.
  pub name: String,
  pub detail1: i64,
  pub detail2: i64,
  pub aux_data: Value,
}

impl<N> From<PlatformEvent<N>> for EventRecord<N> {
  fn from(event: PlatformEvent<N>) -> Self {
    Self {
      name: event.event_type.to_string(),
      source: event.source,
      event_type: event.event_type,
      detail1: event.detail1,
      detail2: event.detail2,
      aux_data: event.aux_data,
    }
  }
}

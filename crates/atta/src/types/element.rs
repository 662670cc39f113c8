/*! Element snapshots. */

use serde::Serialize;

use crate::a11y::format_number;
use crate::platform::{ElementAttributes, PlatformAdapter};

/// Value interface bounds, rendered as the harness expects (`5` rather than `5.0`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct ValueRange {
  pub min: String,
  pub current: String,
  pub max: String,
}

impl ValueRange {
  fn from_bounds((min, current, max): (f64, f64, f64)) -> Self {
    Self {
      min: format_number(min),
      current: format_number(current),
      max: format_number(max),
    }
  }
}

/// Point-in-time copy of one platform node's testable properties.
///
/// Everything is fetched at construction. Afterwards the snapshot never queries
/// the platform again; only relation, method and dump assertions use the node
/// handle it carries.
#[derive(Debug, Clone)]
pub struct AccessibleElement<N> {
  node: N,
  test_id: String,
  attributes: ElementAttributes,
  value_range: Option<ValueRange>,
}

impl<N> AccessibleElement<N> {
  /// Snapshot `node`. A failed fetch leaves every field empty.
  pub fn build<P: PlatformAdapter<Node = N>>(platform: &P, node: N) -> Self {
    let attributes = platform.fetch_attributes(&node).unwrap_or_else(|e| {
      log::warn!("[document] Failed to fetch element attributes: {e}");
      ElementAttributes::default()
    });
    Self::from_attributes(node, attributes)
  }

  /// Snapshot from attributes that were already fetched.
  pub fn from_attributes(node: N, attributes: ElementAttributes) -> Self {
    Self {
      test_id: attributes.test_id().to_owned(),
      value_range: attributes.value_range.map(ValueRange::from_bounds),
      node,
      attributes,
    }
  }

  /// Live handle the snapshot was taken from.
  pub const fn node(&self) -> &N {
    &self.node
  }

  /// Harness id, empty when the node has none.
  pub fn test_id(&self) -> &str {
    &self.test_id
  }

  pub const fn attributes(&self) -> &ElementAttributes {
    &self.attributes
  }

  pub const fn value_range(&self) -> Option<&ValueRange> {
    self.value_range.as_ref()
  }
}

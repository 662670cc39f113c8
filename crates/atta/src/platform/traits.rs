/*!
Platform abstraction traits.

These traits define the contract between the adapter core and an accessibility API
binding (IA2/MSAA, UIA, or the in-memory platform). Core code only talks to the
platform through [`PlatformAdapter`] and never touches API-specific types.
*/

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::a11y::{EventType, MethodSignature, RelationType, Value};
use crate::assertion::PropertyTable;
use crate::types::{AttaResult, PlatformEvent};

/// Which registration list a listener belongs to.
///
/// Document listeners keep the snapshot current (load-complete and rescan
/// triggers); test listeners feed the event history for one test. The two lists
/// are independent even when they name the same event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
  Document,
  Test,
}

/// Callback invoked by the platform when a registered event fires.
pub type EventCallback<N> = Arc<dyn Fn(PlatformEvent<N>) + Send + Sync>;

/// Attributes fetched from a platform node in one pass.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementAttributes {
  /// Platform role constant name (e.g. `ROLE_SYSTEM_PUSHBUTTON`).
  pub role: String,
  pub extended_role: Option<String>,
  pub name: Option<String>,
  pub value: Option<String>,
  pub description: Option<String>,
  pub keyboard_shortcut: Option<String>,
  /// `(min, current, max)`, present only when the node implements a value interface.
  pub value_range: Option<(f64, f64, f64)>,
  pub states: Vec<String>,
  /// `key:value` pairs in platform order. The harness id travels here as `id:<value>`.
  pub object_attributes: Vec<String>,
  pub text_attributes: Vec<String>,
  /// Relation type constant names present on the node.
  pub relations: Vec<String>,
  pub interfaces: Vec<String>,
  /// `(level, similar items in group, position in group)`.
  pub group_position: Option<(i64, i64, i64)>,
  pub column_extent: Option<i64>,
  pub row_extent: Option<i64>,
}

impl ElementAttributes {
  /// Harness-assigned id from the `id:<value>` object attribute, or empty.
  pub fn test_id(&self) -> &str {
    self
      .object_attributes
      .iter()
      .find_map(|attr| attr.strip_prefix("id:"))
      .unwrap_or_default()
  }
}

/// Operations the adapter core needs from an accessibility API.
///
/// Every fallible call returns `Err` instead of panicking; callers catch errors
/// at the narrowest scope (one property, one traversal step).
pub trait PlatformAdapter: Send + Sync + 'static {
  /// Node handle type. Clone is expected to be cheap.
  type Node: Clone + PartialEq + Send + Sync + fmt::Debug + 'static;

  /// API name reported to the harness (e.g. `IAccessible2`).
  fn api_name(&self) -> &str;

  /// API version reported to the harness.
  fn api_version(&self) -> String;

  /// Whether platform accessibility support is switched on.
  fn accessibility_enabled(&self) -> bool;

  /// Try to switch accessibility support on. Returns whether it succeeded.
  fn enable_accessibility(&self) -> bool {
    false
  }

  /// Fetch child nodes. Empty vec if none.
  fn children(&self, node: &Self::Node) -> AttaResult<Vec<Self::Node>>;

  /// Fetch the parent node. `None` for the top of the tree.
  fn parent(&self, node: &Self::Node) -> AttaResult<Option<Self::Node>>;

  /// Fetch all testable attributes of a node.
  fn fetch_attributes(&self, node: &Self::Node) -> AttaResult<ElementAttributes>;

  /// Harness id of a node, or empty when it has none.
  fn element_id(&self, node: &Self::Node) -> AttaResult<String> {
    self
      .fetch_attributes(node)
      .map(|attrs| attrs.test_id().to_owned())
  }

  /// URI of the document rooted at `node`.
  fn document_uri(&self, node: &Self::Node) -> AttaResult<String>;

  /// Nodes pointed to by `relation` from `node`, in platform order.
  fn relation_targets(&self, node: &Self::Node, relation: RelationType)
    -> AttaResult<Vec<Self::Node>>;

  /// Relation types `node` participates in, in platform order.
  fn supported_relations(&self, node: &Self::Node) -> AttaResult<Vec<RelationType>> {
    let attrs = self.fetch_attributes(node)?;
    Ok(
      attrs
        .relations
        .iter()
        .filter_map(|name| RelationType::from_name(name))
        .collect(),
    )
  }

  /// Methods callable on `node`.
  fn supported_methods(&self, node: &Self::Node) -> AttaResult<Vec<MethodSignature>>;

  /// Invoke a method with already-coerced arguments.
  fn invoke(
    &self,
    node: &Self::Node,
    method: &MethodSignature,
    args: &[Value],
  ) -> AttaResult<Value>;

  /// Names of actions `node` supports.
  fn supported_actions(&self, node: &Self::Node) -> AttaResult<Vec<String>>;

  /// Short text for a node in relation renderings: its id, else its role.
  fn describe(&self, node: &Self::Node) -> String {
    match self.fetch_attributes(node) {
      Ok(attrs) if !attrs.test_id().is_empty() => attrs.test_id().to_owned(),
      Ok(attrs) => attrs.role,
      Err(_) => crate::a11y::Value::Null.to_string(),
    }
  }

  /// Event signalling that a document finished loading.
  fn load_complete_event(&self) -> EventType {
    EventType::IA2_DOCUMENT_LOAD_COMPLETE
  }

  /// Events that trigger a rescan of test elements when first seen.
  fn document_events(&self) -> Vec<EventType> {
    EventType::IA2_DOCUMENT_EVENTS.to_vec()
  }

  /// Property name to getter table for this API.
  fn property_table(&self) -> PropertyTable<Self::Node> {
    PropertyTable::standard()
  }

  /// Register `callback` for `event` in the `kind` list.
  fn register_listener(
    &self,
    event: EventType,
    kind: ListenerKind,
    callback: EventCallback<Self::Node>,
  ) -> AttaResult<()>;

  /// Remove the `kind` listener for `event`. Removing an absent listener is not an error.
  fn deregister_listener(&self, event: EventType, kind: ListenerKind) -> AttaResult<()>;
}

/*!
In-memory platform.

A node arena described by JSON-friendly [`NodeSpec`] trees. Events are delivered
synchronously on the thread that calls [`MemoryPlatform::fire`], which mirrors a
native event thread closely enough to exercise the session's locking.

Listener callbacks are invoked with no platform lock held, so they may call back
into the platform.
*/

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use derive_more::{Display, From, Into};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use super::{ElementAttributes, EventCallback, ListenerKind, PlatformAdapter};
use crate::a11y::{EventType, MethodSignature, RelationType, Value};
use crate::types::{AttaError, AttaResult, PlatformEvent};

/// Handle to a node in a [`MemoryPlatform`]. Stays valid for the platform's lifetime.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, From, Into,
)]
#[display("node#{_0}")]
pub struct MemoryNode(usize);

/// A method a node advertises, with the value every call returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSpec {
  #[serde(flatten)]
  pub signature: MethodSignature,
  #[serde(default)]
  pub returns: Value,
}

/// Declarative description of a node and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeSpec {
  #[serde(flatten)]
  pub attributes: ElementAttributes,
  pub children: Vec<NodeSpec>,
  /// Relation name (IA2 or constant spelling) to target test ids.
  pub relation_targets: BTreeMap<String, Vec<String>>,
  pub methods: Vec<MethodSpec>,
  pub actions: Vec<String>,
  /// Document URI, for document roots.
  pub uri: Option<String>,
  /// Every platform call on a defunct node fails.
  pub defunct: bool,
}

impl NodeSpec {
  /// Childless node carrying the harness id `id` (no id when empty).
  pub fn with_id(id: &str) -> Self {
    let mut spec = Self::default();
    if !id.is_empty() {
      spec.attributes.object_attributes.push(format!("id:{id}"));
    }
    spec
  }

  /// Parse a JSON node tree.
  pub fn from_json(json: &str) -> AttaResult<Self> {
    serde_json::from_str(json).map_err(|e| AttaError::Config(format!("invalid node tree: {e}")))
  }

  /// Read and parse a JSON node tree.
  pub fn load(path: &Path) -> AttaResult<Self> {
    let json = std::fs::read_to_string(path)
      .map_err(|e| AttaError::Config(format!("cannot read {}: {e}", path.display())))?;
    Self::from_json(&json)
  }
}

#[derive(Debug)]
struct StoredNode {
  attributes: ElementAttributes,
  relation_targets: BTreeMap<String, Vec<String>>,
  methods: Vec<MethodSpec>,
  actions: Vec<String>,
  uri: Option<String>,
  defunct: bool,
  parent: Option<MemoryNode>,
  children: Vec<MemoryNode>,
}

/// [`PlatformAdapter`] over an in-process node tree.
pub struct MemoryPlatform {
  api_name: String,
  api_version: String,
  enabled: AtomicBool,
  enable_on_request: bool,
  nodes: RwLock<Vec<StoredNode>>,
  listeners: Mutex<HashMap<(EventType, ListenerKind), EventCallback<MemoryNode>>>,
}

impl std::fmt::Debug for MemoryPlatform {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MemoryPlatform")
      .field("api_name", &self.api_name)
      .field("nodes", &self.nodes.read().len())
      .finish_non_exhaustive()
  }
}

impl Default for MemoryPlatform {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryPlatform {
  /// Empty platform reporting IAccessible2, with accessibility enabled.
  pub fn new() -> Self {
    Self {
      api_name: "IAccessible2".to_owned(),
      api_version: "1.3".to_owned(),
      enabled: AtomicBool::new(true),
      enable_on_request: false,
      nodes: RwLock::new(Vec::new()),
      listeners: Mutex::new(HashMap::new()),
    }
  }

  /// Report a different API name and version.
  #[must_use]
  pub fn with_api(mut self, name: &str, version: &str) -> Self {
    self.api_name = name.to_owned();
    self.api_version = version.to_owned();
    self
  }

  /// Start with accessibility switched on or off.
  #[must_use]
  pub fn with_accessibility(self, enabled: bool) -> Self {
    self.enabled.store(enabled, Ordering::SeqCst);
    self
  }

  /// Whether [`PlatformAdapter::enable_accessibility`] succeeds.
  #[must_use]
  pub fn with_enable_on_request(mut self, allowed: bool) -> Self {
    self.enable_on_request = allowed;
    self
  }

  /// Insert a document tree without firing any event. Returns its root.
  pub fn add_document(&self, spec: &NodeSpec) -> MemoryNode {
    insert_tree(&mut self.nodes.write(), spec, None)
  }

  /// Insert a document tree and fire load-complete on its root.
  pub fn load_document(&self, spec: &NodeSpec) -> MemoryNode {
    let root = self.add_document(spec);
    self.fire_event(root, self.load_complete_event());
    root
  }

  /// Append a subtree under `parent`. Returns the subtree root.
  pub fn add_child(&self, parent: &MemoryNode, spec: &NodeSpec) -> MemoryNode {
    let mut nodes = self.nodes.write();
    let child = insert_tree(&mut nodes, spec, Some(*parent));
    if let Some(stored) = nodes.get_mut(usize::from(*parent)) {
      stored.children.push(child);
    }
    child
  }

  /// Mark a node as defunct (or alive again).
  pub fn set_defunct(&self, node: &MemoryNode, defunct: bool) {
    if let Some(stored) = self.nodes.write().get_mut(usize::from(*node)) {
      stored.defunct = defunct;
    }
  }

  /// First node, in insertion order, whose test id is `id`.
  pub fn find(&self, id: &str) -> Option<MemoryNode> {
    self
      .nodes
      .read()
      .iter()
      .position(|n| n.attributes.test_id() == id)
      .map(MemoryNode::from)
  }

  /// Deliver an event to the document and test listeners registered for its type.
  /// Returns how many callbacks ran.
  pub fn fire(&self, event: &PlatformEvent<MemoryNode>) -> usize {
    let callbacks: Vec<EventCallback<MemoryNode>> = {
      let listeners = self.listeners.lock();
      [ListenerKind::Document, ListenerKind::Test]
        .into_iter()
        .filter_map(|kind| listeners.get(&(event.event_type, kind)).cloned())
        .collect()
    };

    for callback in &callbacks {
      callback(event.clone());
    }
    callbacks.len()
  }

  /// Fire an event with no details.
  pub fn fire_event(&self, source: MemoryNode, event_type: EventType) -> usize {
    self.fire(&PlatformEvent::new(source, event_type))
  }

  /// Number of registered listeners of one kind.
  pub fn listener_count(&self, kind: ListenerKind) -> usize {
    self.listeners.lock().keys().filter(|(_, k)| *k == kind).count()
  }

  fn with_node<T>(
    &self,
    node: &MemoryNode,
    f: impl FnOnce(&[StoredNode], &StoredNode) -> AttaResult<T>,
  ) -> AttaResult<T> {
    let nodes = self.nodes.read();
    let stored = nodes
      .get(usize::from(*node))
      .ok_or_else(|| AttaError::NodeNotFound(node.to_string()))?;
    if stored.defunct {
      return Err(AttaError::Platform(format!("{node} is defunct")));
    }
    f(&nodes, stored)
  }
}

fn insert_tree(
  nodes: &mut Vec<StoredNode>,
  spec: &NodeSpec,
  parent: Option<MemoryNode>,
) -> MemoryNode {
  let handle = MemoryNode::from(nodes.len());
  let mut attributes = spec.attributes.clone();
  if attributes.relations.is_empty() {
    attributes.relations = spec
      .relation_targets
      .keys()
      .filter_map(|name| RelationType::from_name(name))
      .map(|relation| relation.constant_name().to_owned())
      .collect();
  }

  nodes.push(StoredNode {
    attributes,
    relation_targets: spec.relation_targets.clone(),
    methods: spec.methods.clone(),
    actions: spec.actions.clone(),
    uri: spec.uri.clone(),
    defunct: spec.defunct,
    parent,
    children: Vec::new(),
  });

  let children: Vec<MemoryNode> = spec
    .children
    .iter()
    .map(|child| insert_tree(nodes, child, Some(handle)))
    .collect();
  if let Some(stored) = nodes.get_mut(usize::from(handle)) {
    stored.children = children;
  }
  handle
}

impl PlatformAdapter for MemoryPlatform {
  type Node = MemoryNode;

  fn api_name(&self) -> &str {
    &self.api_name
  }

  fn api_version(&self) -> String {
    self.api_version.clone()
  }

  fn accessibility_enabled(&self) -> bool {
    self.enabled.load(Ordering::SeqCst)
  }

  fn enable_accessibility(&self) -> bool {
    if self.enable_on_request {
      self.enabled.store(true, Ordering::SeqCst);
    }
    self.accessibility_enabled()
  }

  fn children(&self, node: &MemoryNode) -> AttaResult<Vec<MemoryNode>> {
    self.with_node(node, |_, stored| Ok(stored.children.clone()))
  }

  fn parent(&self, node: &MemoryNode) -> AttaResult<Option<MemoryNode>> {
    self.with_node(node, |_, stored| Ok(stored.parent))
  }

  fn fetch_attributes(&self, node: &MemoryNode) -> AttaResult<ElementAttributes> {
    self.with_node(node, |_, stored| Ok(stored.attributes.clone()))
  }

  fn document_uri(&self, node: &MemoryNode) -> AttaResult<String> {
    self.with_node(node, |_, stored| {
      Ok(
        stored
          .uri
          .clone()
          .or_else(|| stored.attributes.value.clone())
          .unwrap_or_default(),
      )
    })
  }

  fn relation_targets(
    &self,
    node: &MemoryNode,
    relation: RelationType,
  ) -> AttaResult<Vec<MemoryNode>> {
    self.with_node(node, |nodes, stored| {
      let Some(ids) = stored
        .relation_targets
        .iter()
        .find(|(name, _)| RelationType::from_name(name) == Some(relation))
        .map(|(_, ids)| ids)
      else {
        return Ok(Vec::new());
      };

      Ok(
        ids
          .iter()
          .filter_map(|id| {
            nodes
              .iter()
              .position(|n| n.attributes.test_id() == id)
              .map(MemoryNode::from)
          })
          .collect(),
      )
    })
  }

  fn supported_methods(&self, node: &MemoryNode) -> AttaResult<Vec<MethodSignature>> {
    self.with_node(node, |_, stored| {
      Ok(stored.methods.iter().map(|m| m.signature.clone()).collect())
    })
  }

  fn invoke(
    &self,
    node: &MemoryNode,
    method: &MethodSignature,
    _args: &[Value],
  ) -> AttaResult<Value> {
    self.with_node(node, |_, stored| {
      stored
        .methods
        .iter()
        .find(|m| m.signature.name == method.name)
        .map(|m| m.returns.clone())
        .ok_or_else(|| AttaError::UnsupportedMethod(method.name.clone()))
    })
  }

  fn supported_actions(&self, node: &MemoryNode) -> AttaResult<Vec<String>> {
    self.with_node(node, |_, stored| Ok(stored.actions.clone()))
  }

  fn register_listener(
    &self,
    event: EventType,
    kind: ListenerKind,
    callback: EventCallback<MemoryNode>,
  ) -> AttaResult<()> {
    self.listeners.lock().insert((event, kind), callback);
    Ok(())
  }

  fn deregister_listener(&self, event: EventType, kind: ListenerKind) -> AttaResult<()> {
    self.listeners.lock().remove(&(event, kind));
    Ok(())
  }
}

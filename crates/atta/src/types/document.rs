/*!
Document snapshots.

A document snapshot is rebuilt wholesale on load-complete and has its test
elements rescanned when a new event type is first observed. Readers hold an
`Arc` to one snapshot, so a rebuild never shows them a half-built document.
*/

use super::AccessibleElement;
use crate::platform::PlatformAdapter;

/// Harness bookkeeping elements that are never test subjects.
pub const RESERVED_TEST_IDS: &[&str] = &["manualMode", "log", "ATTAmessages"];

/// Snapshot of the document under test.
#[derive(Debug, Clone)]
pub struct AccessibleDocument<N> {
  root: AccessibleElement<N>,
  uri: String,
  observed_events: Vec<String>,
  test_elements: Vec<AccessibleElement<N>>,
}

impl<N: Clone> AccessibleDocument<N> {
  /// Snapshot the document rooted at `root`, including every element with a test id.
  pub fn build<P: PlatformAdapter<Node = N>>(platform: &P, root: N) -> Self {
    let uri = platform.document_uri(&root).unwrap_or_else(|e| {
      log::warn!("[document] Failed to read document URI: {e}");
      String::new()
    });
    let mut document = Self {
      root: AccessibleElement::build(platform, root),
      uri,
      observed_events: Vec::new(),
      test_elements: Vec::new(),
    };
    document.rescan_test_elements(platform);
    document
  }

  /// Record an event type name. Returns `true` only the first time a name is seen.
  pub fn add_event(&mut self, name: &str) -> bool {
    if self.observed_events.iter().any(|seen| seen == name) {
      return false;
    }
    self.observed_events.push(name.to_owned());
    true
  }

  /// Re-walk the live tree and replace the test element list.
  pub fn rescan_test_elements<P: PlatformAdapter<Node = N>>(&mut self, platform: &P) {
    self.test_elements = find_test_nodes(platform, self.root.node())
      .into_iter()
      .map(|node| AccessibleElement::build(platform, node))
      .collect();
    log::debug!(
      "[document] {} test elements in {}",
      self.test_elements.len(),
      self.uri
    );
  }

  /// First test element whose id is exactly `id`.
  pub fn element(&self, id: &str) -> Option<&AccessibleElement<N>> {
    self.test_elements.iter().find(|e| e.test_id() == id)
  }

  /// The document node itself.
  pub const fn root(&self) -> &AccessibleElement<N> {
    &self.root
  }

  /// URI reported when the snapshot was built. Readiness compares against it.
  pub fn uri(&self) -> &str {
    &self.uri
  }

  /// Event type names seen since load, in arrival order.
  pub fn observed_events(&self) -> &[String] {
    &self.observed_events
  }

  /// Elements carrying a harness id, in document order as of the last scan.
  pub fn test_elements(&self) -> &[AccessibleElement<N>] {
    &self.test_elements
  }
}

/// Descendants of `root` (excluding `root`) that carry a non-reserved test id,
/// in document order.
///
/// Iterative preorder walk. A node whose children or id cannot be fetched is
/// treated as childless or unmatched; its siblings are still visited.
fn find_test_nodes<P: PlatformAdapter>(platform: &P, root: &P::Node) -> Vec<P::Node> {
  let mut found = Vec::new();
  let mut stack = children_or_empty(platform, root);
  stack.reverse();

  while let Some(node) = stack.pop() {
    match platform.element_id(&node) {
      Ok(id) if !id.is_empty() && !RESERVED_TEST_IDS.contains(&id.as_str()) => {
        found.push(node.clone());
      }
      Ok(_) => {}
      Err(e) => log::debug!("[document] Skipping id of {node:?}: {e}"),
    }

    let mut children = children_or_empty(platform, &node);
    children.reverse();
    stack.extend(children);
  }

  found
}

fn children_or_empty<P: PlatformAdapter>(platform: &P, node: &P::Node) -> Vec<P::Node> {
  platform.children(node).unwrap_or_else(|e| {
    log::debug!("[document] Treating {node:?} as childless: {e}");
    Vec::new()
  })
}

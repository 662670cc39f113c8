/*! Informational element dumps for `TBD` assertions. */

use serde::Serialize;
use serde_json::{json, Map, Value as Json};

use super::PropertyTable;
use crate::platform::PlatformAdapter;
use crate::types::AccessibleElement;

/// Pretty JSON (4-space indent, sorted keys) describing everything testable on
/// `element`. Platform failures are appended to `messages` and leave that section empty.
pub(super) fn render<P: PlatformAdapter>(
  platform: &P,
  properties: &PropertyTable<P::Node>,
  element: &AccessibleElement<P::Node>,
  messages: &mut Vec<String>,
) -> String {
  let node = element.node();

  let property_values: Map<String, Json> = properties
    .names()
    .filter_map(|name| {
      let value = properties.value(element, name).ok()?;
      Some((name.to_owned(), value.to_json()))
    })
    .collect();

  let mut relation_targets = Map::new();
  let relations = platform.supported_relations(node).unwrap_or_else(|e| {
    messages.push(format!("ERROR: {e}"));
    Vec::new()
  });
  for relation in relations {
    match platform.relation_targets(node, relation) {
      Ok(targets) => {
        let described: Vec<String> = targets.iter().map(|t| platform.describe(t)).collect();
        relation_targets.insert(relation.constant_name().to_owned(), json!(described));
      }
      Err(e) => messages.push(format!("ERROR: {e}")),
    }
  }

  let mut methods: Vec<String> = platform
    .supported_methods(node)
    .unwrap_or_else(|e| {
      messages.push(format!("ERROR: {e}"));
      Vec::new()
    })
    .iter()
    .map(ToString::to_string)
    .collect();
  methods.sort();

  let actions = platform.supported_actions(node).unwrap_or_else(|e| {
    messages.push(format!("ERROR: {e}"));
    Vec::new()
  });

  let info = json!({
    "properties": property_values,
    "relation targets": relation_targets,
    "supported methods": methods,
    "actions": actions,
  });
  to_pretty_json(&info)
}

fn to_pretty_json(value: &Json) -> String {
  let mut buf = Vec::new();
  let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
  let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
  match value.serialize(&mut serializer) {
    Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
    Err(e) => {
      log::error!("[document] Failed to serialize dump: {e}");
      value.to_string()
    }
  }
}

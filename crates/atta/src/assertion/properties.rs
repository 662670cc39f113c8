/*!
Property getters.

Property assertions name a property by string; the table resolves that string to a
typed accessor once, when the adapter is built. Getters read the snapshot only.
*/

use std::collections::BTreeMap;
use std::fmt;

use crate::a11y::Value;
use crate::types::{AccessibleElement, AttaError, AttaResult};

/// Reads one property from an element snapshot.
pub type PropertyGetter<N> = fn(&AccessibleElement<N>) -> Value;

/// Property name to getter table.
pub struct PropertyTable<N> {
  getters: BTreeMap<String, PropertyGetter<N>>,
}

impl<N> Clone for PropertyTable<N> {
  fn clone(&self) -> Self {
    Self {
      getters: self.getters.clone(),
    }
  }
}

impl<N> fmt::Debug for PropertyTable<N> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_set().entries(self.getters.keys()).finish()
  }
}

impl<N> Default for PropertyTable<N> {
  fn default() -> Self {
    Self {
      getters: BTreeMap::new(),
    }
  }
}

impl<N> PropertyTable<N> {
  /// Empty table.
  pub fn new() -> Self {
    Self::default()
  }

  /// MSAA/IA2 property names, plus the short aliases harness files also use.
  pub fn standard() -> Self {
    let mut table = Self::new();
    table
      .insert("accessible", |_| Value::Bool(true))
      .insert("testId", |e| Value::from(e.test_id()))
      .insert("role", |e| Value::from(e.attributes().role.as_str()))
      .insert("localizedExtendedRole", extended_role)
      .insert("extendedRole", extended_role)
      .insert("accName", |e| Value::from(e.attributes().name.clone()))
      .insert("name", |e| Value::from(e.attributes().name.clone()))
      .insert("accValue", |e| Value::from(e.attributes().value.clone()))
      .insert("value", |e| Value::from(e.attributes().value.clone()))
      .insert("accDescription", |e| Value::from(e.attributes().description.clone()))
      .insert("description", |e| Value::from(e.attributes().description.clone()))
      .insert("accKeyboardShortcut", keyboard_shortcut)
      .insert("keyboardShortcut", keyboard_shortcut)
      .insert("states", |e| Value::from(e.attributes().states.clone()))
      .insert("objectAttributes", |e| Value::from(e.attributes().object_attributes.clone()))
      .insert("textAttributes", |e| Value::from(e.attributes().text_attributes.clone()))
      .insert("relations", |e| Value::from(e.attributes().relations.clone()))
      .insert("interfaces", |e| Value::from(e.attributes().interfaces.clone()))
      .insert("minimumValue", |e| Value::from(e.value_range().map(|r| r.min.clone())))
      .insert("currentValue", |e| Value::from(e.value_range().map(|r| r.current.clone())))
      .insert("maximumValue", |e| Value::from(e.value_range().map(|r| r.max.clone())))
      .insert("groupPosition", group_position)
      .insert("columnExtent", |e| Value::from(e.attributes().column_extent))
      .insert("rowExtent", |e| Value::from(e.attributes().row_extent));
    table
  }

  /// Add or replace a getter.
  pub fn insert(&mut self, name: &str, getter: PropertyGetter<N>) -> &mut Self {
    self.getters.insert(name.to_owned(), getter);
    self
  }

  pub fn get(&self, name: &str) -> Option<PropertyGetter<N>> {
    self.getters.get(name).copied()
  }

  /// Supported property names, sorted.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.getters.keys().map(String::as_str)
  }

  /// Read `name` from `element`.
  pub fn value(&self, element: &AccessibleElement<N>, name: &str) -> AttaResult<Value> {
    let getter = self
      .get(name)
      .ok_or_else(|| AttaError::UnsupportedProperty(name.to_owned()))?;
    Ok(getter(element))
  }
}

/// An empty extended role is reported as the literal `null`.
fn extended_role<N>(element: &AccessibleElement<N>) -> Value {
  match element.attributes().extended_role.as_deref() {
    Some(role) if !role.is_empty() => Value::from(role),
    _ => Value::from("null"),
  }
}

fn keyboard_shortcut<N>(element: &AccessibleElement<N>) -> Value {
  Value::from(element.attributes().keyboard_shortcut.clone())
}

/// Rendered as `groupLevel:`, `similarItemsInGroup:`, `positionInGroup:` entries,
/// with `-1` when the platform reports no group.
fn group_position<N>(element: &AccessibleElement<N>) -> Value {
  let (level, similar, position) = element.attributes().group_position.unwrap_or((-1, -1, -1));
  Value::from(vec![
    format!("groupLevel:{level}"),
    format!("similarItemsInGroup:{similar}"),
    format!("positionInGroup:{position}"),
  ])
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::ElementAttributes;

  fn slider() -> AccessibleElement<()> {
    AccessibleElement::from_attributes(
      (),
      ElementAttributes {
        role: "ROLE_SYSTEM_SLIDER".into(),
        name: Some("Volume".into()),
        value_range: Some((0.0, 5.0, 10.0)),
        group_position: Some((1, 3, 2)),
        object_attributes: vec!["id:vol".into()],
        ..Default::default()
      },
    )
  }

  #[test]
  fn aliases_share_getters() {
    let table = PropertyTable::standard();
    let element = slider();
    assert_eq!(table.value(&element, "accName").unwrap(), Value::from("Volume"));
    assert_eq!(table.value(&element, "name").unwrap(), Value::from("Volume"));
    assert_eq!(table.value(&element, "testId").unwrap(), Value::from("vol"));
  }

  #[test]
  fn value_range_properties() {
    let table = PropertyTable::standard();
    let element = slider();
    assert_eq!(table.value(&element, "currentValue").unwrap(), Value::from("5"));
    assert_eq!(table.value(&element, "maximumValue").unwrap(), Value::from("10"));
  }

  #[test]
  fn missing_values_are_null() {
    let table = PropertyTable::standard();
    let element = AccessibleElement::from_attributes((), ElementAttributes::default());
    assert_eq!(table.value(&element, "accDescription").unwrap(), Value::Null);
    assert_eq!(table.value(&element, "minimumValue").unwrap(), Value::Null);
    assert_eq!(table.value(&element, "localizedExtendedRole").unwrap(), Value::from("null"));
  }

  #[test]
  fn group_position_entries() {
    let value = PropertyTable::standard().value(&slider(), "groupPosition").unwrap();
    assert_eq!(
      value,
      Value::from(vec![
        "groupLevel:1".to_string(),
        "similarItemsInGroup:3".to_string(),
        "positionInGroup:2".to_string(),
      ])
    );
  }

  #[test]
  fn unknown_property_is_an_error() {
    let err = PropertyTable::standard().value(&slider(), "colour").unwrap_err();
    assert_eq!(err, AttaError::UnsupportedProperty("colour".into()));
  }

  #[test]
  fn tables_can_be_extended() {
    let mut table = PropertyTable::<()>::new();
    table.insert("shout", |e| Value::from(e.attributes().role.to_uppercase()));
    assert_eq!(table.names().collect::<Vec<_>>(), ["shout"]);
    assert!(table.get("role").is_none());
  }
}

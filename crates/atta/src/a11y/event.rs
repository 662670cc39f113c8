/*!
Event codes.

MSAA WinEvent constants and IA2 event ids share one numeric space, so a single
table maps every code the adapter understands to its symbolic name. Names are
what the harness sends to `startlisten` and what event assertions compare.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform event code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(pub u32);

const EVENT_NAMES: &[(u32, &str)] = &[
  (0x0001, "EVENT_SYSTEM_SOUND"),
  (0x0002, "EVENT_SYSTEM_ALERT"),
  (0x0003, "EVENT_SYSTEM_FOREGROUND"),
  (0x0004, "EVENT_SYSTEM_MENUSTART"),
  (0x0005, "EVENT_SYSTEM_MENUEND"),
  (0x0006, "EVENT_SYSTEM_MENUPOPUPSTART"),
  (0x0007, "EVENT_SYSTEM_MENUPOPUPEND"),
  (0x0008, "EVENT_SYSTEM_CAPTURESTART"),
  (0x0009, "EVENT_SYSTEM_CAPTUREEND"),
  (0x000a, "EVENT_SYSTEM_MOVESIZESTART"),
  (0x000b, "EVENT_SYSTEM_MOVESIZEEND"),
  (0x000c, "EVENT_SYSTEM_CONTEXTHELPSTART"),
  (0x000d, "EVENT_SYSTEM_CONTEXTHELPEND"),
  (0x000e, "EVENT_SYSTEM_DRAGDROPSTART"),
  (0x000f, "EVENT_SYSTEM_DRAGDROPEND"),
  (0x0010, "EVENT_SYSTEM_DIALOGSTART"),
  (0x0011, "EVENT_SYSTEM_DIALOGEND"),
  (0x0012, "EVENT_SYSTEM_SCROLLINGSTART"),
  (0x0013, "EVENT_SYSTEM_SCROLLINGEND"),
  (0x0014, "EVENT_SYSTEM_SWITCHSTART"),
  (0x0015, "EVENT_SYSTEM_SWITCHEND"),
  (0x0016, "EVENT_SYSTEM_MINIMIZESTART"),
  (0x0017, "EVENT_SYSTEM_MINIMIZEEND"),
  (0x0101, "IA2_EVENT_ACTION_CHANGED"),
  (0x0102, "IA2_EVENT_ACTIVE_DESCENDANT_CHANGED"),
  (0x0103, "IA2_EVENT_DOCUMENT_ATTRIBUTE_CHANGED"),
  (0x0104, "IA2_EVENT_DOCUMENT_CONTENT_CHANGED"),
  (0x0105, "IA2_EVENT_DOCUMENT_LOAD_COMPLETE"),
  (0x0106, "IA2_EVENT_DOCUMENT_LOAD_STOPPED"),
  (0x0107, "IA2_EVENT_DOCUMENT_RELOAD"),
  (0x0108, "IA2_EVENT_HYPERLINK_END_INDEX_CHANGED"),
  (0x0109, "IA2_EVENT_HYPERLINK_NUMBER_OF_ANCHORS_CHANGED"),
  (0x010a, "IA2_EVENT_HYPERLINK_SELECTED_LINK_CHANGED"),
  (0x010b, "IA2_EVENT_HYPERTEXT_LINK_ACTIVATED"),
  (0x010c, "IA2_EVENT_HYPERTEXT_LINK_SELECTED"),
  (0x010d, "IA2_EVENT_HYPERLINK_START_INDEX_CHANGED"),
  (0x010e, "IA2_EVENT_HYPERTEXT_CHANGED"),
  (0x010f, "IA2_EVENT_HYPERTEXT_NLINKS_CHANGED"),
  (0x0110, "IA2_EVENT_OBJECT_ATTRIBUTE_CHANGED"),
  (0x0111, "IA2_EVENT_PAGE_CHANGED"),
  (0x0112, "IA2_EVENT_SECTION_CHANGED"),
  (0x0113, "IA2_EVENT_TABLE_CAPTION_CHANGED"),
  (0x0114, "IA2_EVENT_TABLE_COLUMN_DESCRIPTION_CHANGED"),
  (0x0115, "IA2_EVENT_TABLE_COLUMN_HEADER_CHANGED"),
  (0x0116, "IA2_EVENT_TABLE_MODEL_CHANGED"),
  (0x0117, "IA2_EVENT_TABLE_ROW_DESCRIPTION_CHANGED"),
  (0x0118, "IA2_EVENT_TABLE_ROW_HEADER_CHANGED"),
  (0x0119, "IA2_EVENT_TABLE_SUMMARY_CHANGED"),
  (0x011a, "IA2_EVENT_TEXT_ATTRIBUTE_CHANGED"),
  (0x011b, "IA2_EVENT_TEXT_CARET_MOVED"),
  (0x011c, "IA2_EVENT_TEXT_CHANGED"),
  (0x011d, "IA2_EVENT_TEXT_COLUMN_CHANGED"),
  (0x011e, "IA2_EVENT_TEXT_INSERTED"),
  (0x011f, "IA2_EVENT_TEXT_REMOVED"),
  (0x0120, "IA2_EVENT_TEXT_UPDATED"),
  (0x0121, "IA2_EVENT_TEXT_SELECTION_CHANGED"),
  (0x0122, "IA2_EVENT_VISIBLE_DATA_CHANGED"),
  (0x0123, "IA2_EVENT_ROLE_CHANGED"),
  (0x4001, "EVENT_CONSOLE_CARET"),
  (0x4002, "EVENT_CONSOLE_UPDATE_REGION"),
  (0x4003, "EVENT_CONSOLE_UPDATE_SIMPLE"),
  (0x4004, "EVENT_CONSOLE_UPDATE_SCROLL"),
  (0x4005, "EVENT_CONSOLE_LAYOUT"),
  (0x4006, "EVENT_CONSOLE_START_APPLICATION"),
  (0x4007, "EVENT_CONSOLE_END_APPLICATION"),
  (0x8000, "EVENT_OBJECT_CREATE"),
  (0x8001, "EVENT_OBJECT_DESTROY"),
  (0x8002, "EVENT_OBJECT_SHOW"),
  (0x8003, "EVENT_OBJECT_HIDE"),
  (0x8004, "EVENT_OBJECT_REORDER"),
  (0x8005, "EVENT_OBJECT_FOCUS"),
  (0x8006, "EVENT_OBJECT_SELECTION"),
  (0x8007, "EVENT_OBJECT_SELECTIONADD"),
  (0x8008, "EVENT_OBJECT_SELECTIONREMOVE"),
  (0x8009, "EVENT_OBJECT_SELECTIONWITHIN"),
  (0x800a, "EVENT_OBJECT_STATECHANGE"),
  (0x800b, "EVENT_OBJECT_LOCATIONCHANGE"),
  (0x800c, "EVENT_OBJECT_NAMECHANGE"),
  (0x800d, "EVENT_OBJECT_DESCRIPTIONCHANGE"),
  (0x800e, "EVENT_OBJECT_VALUECHANGE"),
  (0x800f, "EVENT_OBJECT_PARENTCHANGE"),
  (0x8010, "EVENT_OBJECT_HELPCHANGE"),
  (0x8011, "EVENT_OBJECT_DEFACTIONCHANGE"),
  (0x8012, "EVENT_OBJECT_ACCELERATORCHANGE"),
];

impl EventType {
  pub const OBJECT_FOCUS: Self = Self(0x8005);
  pub const OBJECT_SELECTION: Self = Self(0x8006);
  pub const OBJECT_SELECTION_REMOVE: Self = Self(0x8008);
  pub const OBJECT_STATE_CHANGE: Self = Self(0x800a);
  pub const OBJECT_NAME_CHANGE: Self = Self(0x800c);
  pub const OBJECT_DESCRIPTION_CHANGE: Self = Self(0x800d);
  pub const OBJECT_VALUE_CHANGE: Self = Self(0x800e);
  pub const IA2_ACTIVE_DESCENDANT_CHANGED: Self = Self(0x0102);
  pub const IA2_DOCUMENT_LOAD_COMPLETE: Self = Self(0x0105);
  pub const IA2_OBJECT_ATTRIBUTE_CHANGED: Self = Self(0x0110);

  /// Events that can change which elements carry test ids, for MSAA+IA2.
  pub const IA2_DOCUMENT_EVENTS: &'static [Self] = &[
    Self::OBJECT_FOCUS,
    Self::OBJECT_STATE_CHANGE,
    Self::OBJECT_SELECTION,
    Self::OBJECT_SELECTION_REMOVE,
    Self::OBJECT_NAME_CHANGE,
    Self::OBJECT_DESCRIPTION_CHANGE,
    Self::IA2_ACTIVE_DESCENDANT_CHANGED,
    Self::IA2_OBJECT_ATTRIBUTE_CHANGED,
  ];

  /// Symbolic name, if the code is in the table.
  pub fn name(self) -> Option<&'static str> {
    EVENT_NAMES
      .iter()
      .find(|(code, _)| *code == self.0)
      .map(|(_, name)| *name)
  }

  /// Look up a code by its symbolic name.
  pub fn from_name(name: &str) -> Option<Self> {
    EVENT_NAMES
      .iter()
      .find(|(_, n)| *n == name)
      .map(|(code, _)| Self(*code))
  }
}

impl fmt::Display for EventType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.name() {
      Some(name) => f.write_str(name),
      None => write!(f, "0x{:04x}", self.0),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_codes_have_names() {
    assert_eq!(
      EventType::IA2_DOCUMENT_LOAD_COMPLETE.name(),
      Some("IA2_EVENT_DOCUMENT_LOAD_COMPLETE")
    );
    assert_eq!(EventType::OBJECT_FOCUS.name(), Some("EVENT_OBJECT_FOCUS"));
    assert_eq!(EventType(0x7777).name(), None);
  }

  #[test]
  fn names_round_trip() {
    for (code, name) in EVENT_NAMES {
      assert_eq!(EventType::from_name(name), Some(EventType(*code)));
    }
  }

  #[test]
  fn codes_are_unique() {
    let mut codes: Vec<u32> = EVENT_NAMES.iter().map(|(c, _)| *c).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), EVENT_NAMES.len());
  }

  #[test]
  fn document_events_are_all_named() {
    for event in EventType::IA2_DOCUMENT_EVENTS {
      assert!(event.name().is_some(), "{event:?} missing from table");
    }
  }

  #[test]
  fn display_falls_back_to_hex() {
    assert_eq!(EventType(0x7777).to_string(), "0x7777");
    assert_eq!(EventType::OBJECT_NAME_CHANGE.to_string(), "EVENT_OBJECT_NAMECHANGE");
  }
}

/*!
Relation types.

The harness names relations the way IA2 does (`labelledBy`); snapshots report them
as constants (`LABELLED_BY`). Both spellings resolve here, as does the
`RELATION_`-prefixed constant form some platform dumps use.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! relation_types {
  ($($variant:ident => $ia2:literal, $constant:literal;)*) => {
    /// A typed directed link between accessible nodes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(into = "String", try_from = "String")]
    pub enum RelationType {
      $(
        #[allow(missing_docs)]
        $variant,
      )*
    }

    impl RelationType {
      /// Every relation type, in declaration order.
      pub const ALL: &'static [Self] = &[$(Self::$variant),*];

      /// IA2 relation string (`labelledBy`).
      pub const fn ia2_name(self) -> &'static str {
        match self {
          $(Self::$variant => $ia2,)*
        }
      }

      /// Constant name as reported in snapshots (`LABELLED_BY`).
      pub const fn constant_name(self) -> &'static str {
        match self {
          $(Self::$variant => $constant,)*
        }
      }
    }
  };
}

relation_types! {
  LabelledBy => "labelledBy", "LABELLED_BY";
  LabelFor => "labelFor", "LABEL_FOR";
  DescribedBy => "describedBy", "DESCRIBED_BY";
  DescriptionFor => "descriptionFor", "DESCRIPTION_FOR";
  ControlledBy => "controlledBy", "CONTROLLED_BY";
  ControllerFor => "controllerFor", "CONTROLLER_FOR";
  FlowsTo => "flowsTo", "FLOWS_TO";
  FlowsFrom => "flowsFrom", "FLOWS_FROM";
  MemberOf => "memberOf", "MEMBER_OF";
  NodeChildOf => "nodeChildOf", "NODE_CHILD_OF";
  NodeParentOf => "nodeParentOf", "NODE_PARENT_OF";
  PopupFor => "popupFor", "POPUP_FOR";
  SubwindowOf => "subwindowOf", "SUBWINDOW_OF";
  EmbeddedBy => "embeddedBy", "EMBEDDED_BY";
  Embeds => "embeds", "EMBEDS";
  ParentWindowOf => "parentWindowOf", "PARENT_WINDOW_OF";
  ContainingDocument => "containingDocument", "CONTAINING_DOCUMENT";
  ContainingTabPane => "containingTabPane", "CONTAINING_TAB_PANE";
  ContainingWindow => "containingWindow", "CONTAINING_WINDOW";
  ContainingApplication => "containingApplication", "CONTAINING_APPLICATION";
  Details => "details", "DETAILS";
  DetailsFor => "detailsFor", "DETAILS_FOR";
  ErrorMessage => "error", "ERROR";
  ErrorFor => "errorFor", "ERROR_FOR";
}

impl RelationType {
  /// Resolve a relation from any accepted spelling.
  pub fn from_name(name: &str) -> Option<Self> {
    let name = name.trim();
    let constant = name.strip_prefix("RELATION_").unwrap_or(name);
    Self::ALL.iter().copied().find(|r| {
      r.ia2_name() == name || r.constant_name() == constant || legacy_alias(name) == Some(*r)
    })
  }
}

/// Older IA2 spellings still emitted by some browsers.
fn legacy_alias(name: &str) -> Option<RelationType> {
  match name {
    "errorMessage" => Some(RelationType::ErrorMessage),
    "ERROR_MESSAGE" => Some(RelationType::ErrorMessage),
    _ => None,
  }
}

impl fmt::Display for RelationType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.constant_name())
  }
}

impl From<RelationType> for String {
  fn from(r: RelationType) -> Self {
    r.ia2_name().to_owned()
  }
}

impl TryFrom<String> for RelationType {
  type Error = crate::AttaError;

  fn try_from(name: String) -> Result<Self, Self::Error> {
    Self::from_name(&name).ok_or(crate::AttaError::UnknownRelation(name))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolves_every_spelling() {
    assert_eq!(RelationType::from_name("labelledBy"), Some(RelationType::LabelledBy));
    assert_eq!(RelationType::from_name("LABELLED_BY"), Some(RelationType::LabelledBy));
    assert_eq!(
      RelationType::from_name("RELATION_LABELLED_BY"),
      Some(RelationType::LabelledBy)
    );
    assert_eq!(RelationType::from_name("errorMessage"), Some(RelationType::ErrorMessage));
    assert_eq!(RelationType::from_name("nonsense"), None);
  }

  #[test]
  fn names_are_unique() {
    let mut ia2: Vec<_> = RelationType::ALL.iter().map(|r| r.ia2_name()).collect();
    ia2.sort_unstable();
    ia2.dedup();
    assert_eq!(ia2.len(), RelationType::ALL.len());
  }

  #[test]
  fn display_is_constant_name() {
    assert_eq!(RelationType::DescribedBy.to_string(), "DESCRIBED_BY");
  }

  #[test]
  fn serde_uses_ia2_names() {
    let json = serde_json::to_string(&RelationType::FlowsTo).unwrap();
    assert_eq!(json, "\"flowsTo\"");
    let back: RelationType = serde_json::from_str("\"FLOWS_TO\"").unwrap();
    assert_eq!(back, RelationType::FlowsTo);
  }
}

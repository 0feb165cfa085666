//! Entities that reference other entities: groups and scenes.

use serde::{Deserialize, Serialize};

use super::attribute_value::{AttributeLookup, Attributes};
use crate::id::EntityId;

/// Ordered member identifiers from `attributes.entity_id`.
///
/// Identifiers that are not valid [`EntityId`]s are skipped.
fn member_ids(attributes: &Attributes) -> Vec<EntityId> {
    attributes
        .list_attr("entity_id")
        .unwrap_or_default()
        .into_iter()
        .filter_map(|raw| EntityId::new(raw).ok())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub members: Vec<EntityId>,
    /// Rendered as a tab rather than a card.
    pub is_view: bool,
    /// Created by the hub itself rather than configured.
    pub is_auto: bool,
    pub order: Option<i64>,
}

impl Group {
    #[must_use]
    pub fn from_attributes(attributes: &Attributes) -> Self {
        Self {
            members: member_ids(attributes),
            is_view: attributes.bool_attr("view").unwrap_or(false),
            is_auto: attributes.bool_attr("auto").unwrap_or(false),
            order: attributes.i64_attr("order"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub members: Vec<EntityId>,
}

impl Scene {
    #[must_use]
    pub fn from_attributes(attributes: &Attributes) -> Self {
        Self {
            members: member_ids(attributes),
        }
    }
}

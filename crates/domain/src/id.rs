//! Entity identifiers of the form `<domain>.<object_id>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::transform::domain_of;

/// Unique identifier for an [`Entity`](crate::entity::Entity), e.g. `light.kitchen`.
///
/// The domain prefix (everything before the first `.`) selects the entity's
/// concrete details. The identifier never changes once built; it is the
/// primary key in the local cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Wrap a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyEntityId`] when `raw` is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ValidationError::EmptyEntityId);
        }
        Ok(Self(raw))
    }

    /// The domain prefix (`light` for `light.kitchen`).
    #[must_use]
    pub fn domain(&self) -> &str {
        domain_of(&self.0)
    }

    /// The part after the first `.`, or the whole id when there is none.
    #[must_use]
    pub fn object_id(&self) -> &str {
        self.0.split_once('.').map_or(self.0.as_str(), |(_, rest)| rest)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

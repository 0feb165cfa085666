//! Entity — a single observable or controllable thing known to the hub.
//!
//! Entities are built fresh from each state payload and never mutated in
//! place: the derived metadata (friendly name, icon, …) and the
//! domain-specific [`EntityDetails`] are computed once, at construction.

mod attribute_value;
mod climate;
mod details;
mod domain;
mod group;
mod location;
mod media_player;
mod sensor;
mod switchable;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use attribute_value::{AttributeLookup, AttributeValue, Attributes};
pub use climate::{Climate, Thermostat};
pub use details::EntityDetails;
pub use domain::Domain;
pub use group::{Group, Scene};
pub use location::{Coordinate, DeviceTracker, Zone};
pub use media_player::MediaPlayer;
pub use sensor::{InputSelect, InputSlider, Sensor, Sun, Weblink};
pub use switchable::{Fan, GarageDoor, Light, Lock, Toggle};

use crate::error::{DecodeError, HomeSyncError};
use crate::id::EntityId;
use crate::time::{Timestamp, TimestampTransform};

/// State reported for entities the hub no longer reaches.
pub const STATE_UNAVAILABLE: &str = "unavailable";
/// State given to placeholder entities.
pub const STATE_UNKNOWN: &str = "unknown";

/// Wire representation of an entity state, as served by `/api/states`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub entity_id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub attributes: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_changed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// A hub entity with its derived metadata and typed details.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    domain: Domain,
    state: String,
    attributes: Attributes,
    friendly_name: Option<String>,
    hidden: bool,
    icon: Option<String>,
    mobile_icon: Option<String>,
    picture: Option<String>,
    unit_of_measurement: Option<String>,
    last_changed: Option<Timestamp>,
    last_updated: Option<Timestamp>,
    details: EntityDetails,
}

impl Entity {
    /// Create a builder for constructing an [`Entity`].
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Decode a JSON state object.
    ///
    /// Timestamps that cannot be parsed are dropped rather than failing the
    /// whole entity.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the value is not an object, when
    /// `entity_id` is missing or not a string, or when it is empty.
    pub fn from_json(value: &Value, timestamps: &TimestampTransform) -> Result<Self, DecodeError> {
        let object = value.as_object().ok_or(DecodeError::NotAnObject)?;
        match object.get("entity_id") {
            None | Some(Value::Null) => return Err(DecodeError::MissingField("entity_id")),
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(DecodeError::InvalidField {
                    field: "entity_id",
                    expected: "string",
                });
            }
        }
        let snapshot: StateSnapshot = serde_json::from_value(value.clone())?;
        Self::from_snapshot(snapshot, timestamps)
    }

    /// Build an entity from its wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Entity`] when `entity_id` is empty.
    pub fn from_snapshot(
        snapshot: StateSnapshot,
        timestamps: &TimestampTransform,
    ) -> Result<Self, DecodeError> {
        let id = EntityId::new(snapshot.entity_id).map_err(DecodeError::Entity)?;
        let parse = |raw: Option<String>| raw.as_deref().and_then(|s| timestamps.parse(s));
        Ok(Self::assemble(
            id,
            snapshot.state.unwrap_or_default(),
            snapshot.attributes.unwrap_or_default(),
            parse(snapshot.last_changed),
            parse(snapshot.last_updated),
            timestamps,
        ))
    }

    /// Stand-in for a referenced entity that is not in the cache.
    #[must_use]
    pub fn placeholder(id: EntityId) -> Self {
        Self::assemble(
            id,
            STATE_UNKNOWN.to_string(),
            Attributes::new(),
            None,
            None,
            &TimestampTransform::default(),
        )
    }

    fn assemble(
        id: EntityId,
        state: String,
        attributes: Attributes,
        last_changed: Option<Timestamp>,
        last_updated: Option<Timestamp>,
        timestamps: &TimestampTransform,
    ) -> Self {
        let domain = Domain::parse(id.domain());
        let details = EntityDetails::compute(&domain, &state, &attributes, timestamps);
        Self {
            friendly_name: attributes.string_attr("friendly_name"),
            hidden: attributes.bool_attr("hidden").unwrap_or(false),
            icon: attributes.string_attr("icon"),
            mobile_icon: attributes.string_attr("mobile_icon"),
            picture: attributes.string_attr("entity_picture"),
            unit_of_measurement: attributes.string_attr("unit_of_measurement"),
            id,
            domain,
            state,
            attributes,
            last_changed,
            last_updated,
            details,
        }
    }

    /// Wire representation, timestamps formatted with `timestamps`.
    #[must_use]
    pub fn to_snapshot(&self, timestamps: &TimestampTransform) -> StateSnapshot {
        StateSnapshot {
            entity_id: self.id.to_string(),
            state: Some(self.state.clone()),
            attributes: Some(self.attributes.clone()),
            last_changed: self.last_changed.map(|ts| timestamps.format(ts)),
            last_updated: self.last_updated.map(|ts| timestamps.format(ts)),
        }
    }

    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    #[must_use]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Look up an attribute by key.
    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    #[must_use]
    pub fn friendly_name(&self) -> Option<&str> {
        self.friendly_name.as_deref()
    }

    #[must_use]
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    #[must_use]
    pub fn mobile_icon(&self) -> Option<&str> {
        self.mobile_icon.as_deref()
    }

    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }

    #[must_use]
    pub fn unit_of_measurement(&self) -> Option<&str> {
        self.unit_of_measurement.as_deref()
    }

    #[must_use]
    pub fn last_changed(&self) -> Option<Timestamp> {
        self.last_changed
    }

    #[must_use]
    pub fn last_updated(&self) -> Option<Timestamp> {
        self.last_updated
    }

    #[must_use]
    pub fn details(&self) -> &EntityDetails {
        &self.details
    }

    /// Display name: the friendly name, else the humanized object id.
    #[must_use]
    pub fn name(&self) -> String {
        self.friendly_name
            .clone()
            .unwrap_or_else(|| humanize(self.id.object_id()))
    }

    /// The state, humanized (`not_home` → `Not Home`).
    #[must_use]
    pub fn cleaned_state(&self) -> String {
        humanize(&self.state)
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state != STATE_UNAVAILABLE
    }

    /// Whether `self` was last updated strictly before `other`.
    ///
    /// Entities without a `last_updated` timestamp are never considered older.
    #[must_use]
    pub fn is_older_than(&self, other: &Entity) -> bool {
        matches!(
            (self.last_updated, other.last_updated),
            (Some(mine), Some(theirs)) if mine < theirs
        )
    }
}

/// Replace `_` with spaces and capitalize every word.
fn humanize(raw: &str) -> String {
    raw.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    entity_id: Option<String>,
    state: String,
    attributes: Attributes,
    last_changed: Option<Timestamp>,
    last_updated: Option<Timestamp>,
    timestamps: TimestampTransform,
}

impl EntityBuilder {
    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub fn last_changed(mut self, ts: Timestamp) -> Self {
        self.last_changed = Some(ts);
        self
    }

    #[must_use]
    pub fn last_updated(mut self, ts: Timestamp) -> Self {
        self.last_updated = Some(ts);
        self
    }

    /// Transform used for timestamps embedded in attributes (`next_rising`, …).
    #[must_use]
    pub fn timestamps(mut self, timestamps: TimestampTransform) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeSyncError::Validation`] if `entity_id` is missing or empty.
    pub fn build(self) -> Result<Entity, HomeSyncError> {
        let id = EntityId::new(self.entity_id.unwrap_or_default())?;
        Ok(Entity::assemble(
            id,
            self.state,
            self.attributes,
            self.last_changed,
            self.last_updated,
            &self.timestamps,
        ))
    }
}

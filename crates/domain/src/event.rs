//! Hub events received over the real-time stream.
//!
//! Every frame is a JSON object with an `event_type`, an optional
//! `time_fired`, an `origin` and a type-specific `data` object. Only the
//! event types the client reacts to are decoded; anything else yields
//! `None` so the consumer can log and discard it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::Entity;
use crate::error::DecodeError;
use crate::id::EntityId;
use crate::time::{Timestamp, TimestampTransform};

pub const STATE_CHANGED: &str = "state_changed";
pub const CALL_SERVICE: &str = "call_service";
pub const SERVICE_EXECUTED: &str = "service_executed";

/// Where the event was raised.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventOrigin {
    #[default]
    Local,
    Remote,
    Other(String),
}

impl From<String> for EventOrigin {
    fn from(value: String) -> Self {
        match value.as_str() {
            "LOCAL" => Self::Local,
            "REMOTE" => Self::Remote,
            _ => Self::Other(value),
        }
    }
}

impl From<EventOrigin> for String {
    fn from(origin: EventOrigin) -> Self {
        origin.to_string()
    }
}

impl fmt::Display for EventOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("LOCAL"),
            Self::Remote => f.write_str("REMOTE"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// Fields shared by every event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMeta {
    pub event_type: String,
    pub time_fired: Option<Timestamp>,
    pub origin: EventOrigin,
}

/// An entity moved from one state to another.
///
/// At least one of `old_state` and `new_state` is present: `old_state` is
/// absent for newly created entities, `new_state` for removed ones.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChangedEvent {
    pub meta: EventMeta,
    pub entity_id: EntityId,
    pub old_state: Option<Entity>,
    pub new_state: Option<Entity>,
}

/// A service was invoked on the hub.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCalledEvent {
    pub meta: EventMeta,
    pub domain: String,
    pub service: String,
    pub service_data: Map<String, Value>,
    pub service_call_id: Option<String>,
}

/// A previously called service finished.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceExecutedEvent {
    pub meta: EventMeta,
    pub service_call_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    StateChanged(Box<StateChangedEvent>),
    CallService(ServiceCalledEvent),
    ServiceExecuted(ServiceExecutedEvent),
}

impl HubEvent {
    /// Decode a raw frame payload.
    ///
    /// # Errors
    ///
    /// See [`HubEvent::decode`]; invalid JSON is reported as [`DecodeError::Json`].
    pub fn decode_str(
        raw: &str,
        timestamps: &TimestampTransform,
    ) -> Result<Option<Self>, DecodeError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::decode(&value, timestamps)
    }

    /// Decode an event object, dispatching on `event_type`.
    ///
    /// Returns `Ok(None)` for event types the client does not handle.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the frame is not an object, has no
    /// string `event_type`, carries a malformed entity state, or is a
    /// `state_changed` event with neither an old nor a new state.
    pub fn decode(value: &Value, timestamps: &TimestampTransform) -> Result<Option<Self>, DecodeError> {
        let object = value.as_object().ok_or(DecodeError::NotAnObject)?;
        let event_type = match object.get("event_type") {
            None => return Err(DecodeError::MissingField("event_type")),
            Some(Value::String(event_type)) => event_type.clone(),
            Some(_) => {
                return Err(DecodeError::InvalidField {
                    field: "event_type",
                    expected: "string",
                });
            }
        };
        let meta = EventMeta {
            time_fired: object
                .get("time_fired")
                .and_then(Value::as_str)
                .and_then(|raw| timestamps.parse_event_time(raw)),
            origin: object
                .get("origin")
                .and_then(Value::as_str)
                .map(|origin| EventOrigin::from(origin.to_string()))
                .unwrap_or_default(),
            event_type,
        };
        let empty = Map::new();
        let data = object.get("data").and_then(Value::as_object).unwrap_or(&empty);

        let kind = meta.event_type.clone();
        let event = match kind.as_str() {
            STATE_CHANGED => {
                Self::StateChanged(Box::new(decode_state_changed(meta, data, timestamps)?))
            }
            CALL_SERVICE => Self::CallService(ServiceCalledEvent {
                domain: string_field(data, "domain").unwrap_or_default(),
                service: string_field(data, "service").unwrap_or_default(),
                service_data: data
                    .get("service_data")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default(),
                service_call_id: string_field(data, "service_call_id"),
                meta,
            }),
            SERVICE_EXECUTED => Self::ServiceExecuted(ServiceExecutedEvent {
                service_call_id: string_field(data, "service_call_id"),
                meta,
            }),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    #[must_use]
    pub fn meta(&self) -> &EventMeta {
        match self {
            Self::StateChanged(event) => &event.meta,
            Self::CallService(event) => &event.meta,
            Self::ServiceExecuted(event) => &event.meta,
        }
    }
}

fn string_field(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

fn decode_state_changed(
    meta: EventMeta,
    data: &Map<String, Value>,
    timestamps: &TimestampTransform,
) -> Result<StateChangedEvent, DecodeError> {
    let state = |key: &str| -> Result<Option<Entity>, DecodeError> {
        match data.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Entity::from_json(value, timestamps).map(Some),
        }
    };
    let old_state = state("old_state")?;
    let new_state = state("new_state")?;

    let entity_id = match string_field(data, "entity_id") {
        Some(raw) => EntityId::new(raw).map_err(DecodeError::Entity)?,
        None => new_state
            .as_ref()
            .or(old_state.as_ref())
            .map(|entity| entity.id().clone())
            .ok_or(DecodeError::MissingField("entity_id"))?,
    };
    if old_state.is_none() && new_state.is_none() {
        return Err(DecodeError::EmptyStateChange {
            entity_id: entity_id.to_string(),
        });
    }

    Ok(StateChangedEvent {
        meta,
        entity_id,
        old_state,
        new_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityDetails;
    use chrono::Timelike;
    use serde_json::json;

    fn decode(value: &Value) -> Result<Option<HubEvent>, DecodeError> {
        HubEvent::decode(value, &TimestampTransform::default())
    }

    #[test]
    fn should_decode_state_changed_with_both_states() {
        let event = decode(&json!({
            "event_type": "state_changed",
            "time_fired": "2016-04-05T12:30:15.250+00:00",
            "origin": "LOCAL",
            "data": {
                "entity_id": "switch.porch",
                "old_state": {"entity_id": "switch.porch", "state": "off"},
                "new_state": {"entity_id": "switch.porch", "state": "on"}
            }
        }))
        .unwrap()
        .unwrap();

        let HubEvent::StateChanged(changed) = event else {
            panic!("expected state_changed");
        };
        assert_eq!(changed.entity_id.as_str(), "switch.porch");
        assert_eq!(changed.meta.origin, EventOrigin::Local);
        assert_eq!(changed.meta.time_fired.map(|t| t.hour()), Some(12));
        let new_state = changed.new_state.as_ref().unwrap();
        assert_eq!(new_state.details().is_on(), Some(true));
        assert_eq!(
            changed.old_state.as_ref().unwrap().details().is_on(),
            Some(false)
        );
        assert!(matches!(new_state.details(), EntityDetails::Switch(_)));
    }

    #[test]
    fn should_decode_removed_entity_without_new_state() {
        let event = decode(&json!({
            "event_type": "state_changed",
            "data": {
                "entity_id": "light.gone",
                "old_state": {"entity_id": "light.gone", "state": "on"},
                "new_state": null
            }
        }))
        .unwrap()
        .unwrap();
        let HubEvent::StateChanged(changed) = event else {
            panic!("expected state_changed");
        };
        assert!(changed.new_state.is_none());
        assert!(changed.old_state.is_some());
    }

    #[test]
    fn should_reject_state_changed_without_any_state() {
        let result = decode(&json!({
            "event_type": "state_changed",
            "data": {"entity_id": "light.x", "old_state": null, "new_state": null}
        }));
        assert!(matches!(result, Err(DecodeError::EmptyStateChange { .. })));
    }

    #[test]
    fn should_take_entity_id_from_new_state_when_data_lacks_it() {
        let event = decode(&json!({
            "event_type": "state_changed",
            "data": {"new_state": {"entity_id": "sensor.temp", "state": "21"}}
        }))
        .unwrap()
        .unwrap();
        let HubEvent::StateChanged(changed) = event else {
            panic!("expected state_changed");
        };
        assert_eq!(changed.entity_id.as_str(), "sensor.temp");
    }

    #[test]
    fn should_decode_call_service() {
        let event = decode(&json!({
            "event_type": "call_service",
            "origin": "REMOTE",
            "data": {
                "domain": "light",
                "service": "turn_on",
                "service_data": {"entity_id": "light.kitchen"},
                "service_call_id": "42-1"
            }
        }))
        .unwrap()
        .unwrap();
        let HubEvent::CallService(call) = event else {
            panic!("expected call_service");
        };
        assert_eq!(call.domain, "light");
        assert_eq!(call.service, "turn_on");
        assert_eq!(call.service_data["entity_id"], "light.kitchen");
        assert_eq!(call.service_call_id.as_deref(), Some("42-1"));
        assert_eq!(call.meta.origin, EventOrigin::Remote);
    }

    #[test]
    fn should_decode_service_executed() {
        let event = decode(&json!({
            "event_type": "service_executed",
            "time_fired": "08:15:00 20-07-2017",
            "data": {"service_call_id": "42-1"}
        }))
        .unwrap()
        .unwrap();
        assert_eq!(event.meta().event_type, SERVICE_EXECUTED);
        assert!(event.meta().time_fired.is_some());
        let HubEvent::ServiceExecuted(done) = event else {
            panic!("expected service_executed");
        };
        assert_eq!(done.service_call_id.as_deref(), Some("42-1"));
    }

    #[test]
    fn should_ignore_unknown_event_type() {
        let result = decode(&json!({"event_type": "homeassistant_start", "data": {}}));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn should_fail_without_event_type() {
        let result = decode(&json!({"data": {"entity_id": "light.x"}}));
        assert!(matches!(result, Err(DecodeError::MissingField("event_type"))));
    }

    #[test]
    fn should_fail_on_invalid_json_text() {
        let result = HubEvent::decode_str("{not json", &TimestampTransform::default());
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    #[test]
    fn should_keep_unrecognised_origin() {
        assert_eq!(
            EventOrigin::from("BRIDGE".to_string()),
            EventOrigin::Other("BRIDGE".to_string())
        );
        assert_eq!(EventOrigin::Remote.to_string(), "REMOTE");
    }
}

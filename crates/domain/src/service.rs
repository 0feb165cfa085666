//! Service calls sent to the hub.
//!
//! Examples: `light.turn_on`, `switch.toggle`, `device_tracker.see`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::id::EntityId;

/// Domain whose services apply to any entity regardless of its own domain.
pub const GENERIC_DOMAIN: &str = "homeassistant";

/// A service invocation: `<domain>.<service>` plus its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl ServiceCall {
    #[must_use]
    pub fn new(domain: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            service: service.into(),
            data: Map::new(),
        }
    }

    /// Parse a `<domain>.<service>` string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedService`] unless both parts are
    /// present and non-empty.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.split_once('.') {
            Some((domain, service)) if !domain.is_empty() && !service.is_empty() => {
                Ok(Self::new(domain, service))
            }
            _ => Err(ValidationError::MalformedService(raw.to_string())),
        }
    }

    /// Add one entry to the service data.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// `homeassistant.turn_on` targeting `entity`.
    #[must_use]
    pub fn turn_on(entity: &EntityId) -> Self {
        Self::new(GENERIC_DOMAIN, "turn_on").with("entity_id", entity.as_str())
    }

    /// `homeassistant.turn_off` targeting `entity`.
    #[must_use]
    pub fn turn_off(entity: &EntityId) -> Self {
        Self::new(GENERIC_DOMAIN, "turn_off").with("entity_id", entity.as_str())
    }

    /// `homeassistant.toggle` targeting `entity`.
    #[must_use]
    pub fn toggle(entity: &EntityId) -> Self {
        Self::new(GENERIC_DOMAIN, "toggle").with("entity_id", entity.as_str())
    }
}

impl fmt::Display for ServiceCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.service)
    }
}

impl FromStr for ServiceCall {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_domain_and_service() {
        let call = ServiceCall::parse("light.turn_on").unwrap();
        assert_eq!(call.domain, "light");
        assert_eq!(call.service, "turn_on");
        assert!(call.data.is_empty());
        assert_eq!(call.to_string(), "light.turn_on");
    }

    #[test]
    fn should_reject_service_without_dot() {
        assert_eq!(
            ServiceCall::parse("turn_on"),
            Err(ValidationError::MalformedService("turn_on".to_string()))
        );
        assert!(ServiceCall::parse(".turn_on").is_err());
        assert!(ServiceCall::parse("light.").is_err());
    }

    #[test]
    fn should_target_entity_through_generic_domain() {
        let id = EntityId::new("switch.porch").unwrap();
        let call = ServiceCall::toggle(&id);
        assert_eq!(call.domain, GENERIC_DOMAIN);
        assert_eq!(call.service, "toggle");
        assert_eq!(call.data["entity_id"], "switch.porch");
        assert_eq!(ServiceCall::turn_on(&id).service, "turn_on");
        assert_eq!(ServiceCall::turn_off(&id).service, "turn_off");
    }
}

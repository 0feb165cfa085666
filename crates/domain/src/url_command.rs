//! Commands carried by custom-scheme URLs.
//!
//! `homeassistant://call_service/light.turn_on?entity_id=light.kitchen`
//! names the command in the host, its target in the first path segment and
//! its data in the query string, read as a flat string map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::error::ValidationError;
use crate::service::ServiceCall;

/// Flat query-string data.
pub type CommandData = BTreeMap<String, String>;

/// A parsed URL command.
#[derive(Debug, Clone, PartialEq)]
pub enum UrlCommand {
    CallService(ServiceCall),
    FireEvent { event_type: String, data: CommandData },
    SendLocation,
    /// OAuth redirect; handed back to the caller untouched.
    AuthCallback { url: String },
}

impl UrlCommand {
    /// Parse a command URL.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the URL is invalid, names an
    /// unsupported command, or lacks the path segment its command needs.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let url = Url::parse(raw).map_err(ValidationError::InvalidUrl)?;
        let command = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let target = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);
        let data: CommandData = url.query_pairs().into_owned().collect();

        match command.as_str() {
            "call_service" => {
                let target = target.ok_or(ValidationError::IncompleteUrlCommand {
                    command: "call_service",
                    part: "service",
                })?;
                let call = ServiceCall::parse(&target)?.with_data(into_json(data));
                Ok(Self::CallService(call))
            }
            "fire_event" => {
                let event_type = target.ok_or(ValidationError::IncompleteUrlCommand {
                    command: "fire_event",
                    part: "event type",
                })?;
                Ok(Self::FireEvent { event_type, data })
            }
            "send_location" => Ok(Self::SendLocation),
            "auth-callback" => Ok(Self::AuthCallback {
                url: raw.to_string(),
            }),
            _ => Err(ValidationError::UnknownUrlCommand(command)),
        }
    }
}

/// Query data as a JSON object of strings.
#[must_use]
pub fn into_json(data: CommandData) -> Map<String, Value> {
    data.into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

/// Position reported by `send_location`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters.
    #[serde(default)]
    pub accuracy: Option<f64>,
}

impl DeviceLocation {
    /// `device_tracker.see` reporting this location for `device_id`.
    #[must_use]
    pub fn to_service_call(&self, device_id: &str) -> ServiceCall {
        let call = ServiceCall::new("device_tracker", "see")
            .with("dev_id", device_id)
            .with("gps", vec![self.latitude, self.longitude]);
        match self.accuracy {
            Some(accuracy) => call.with("gps_accuracy", accuracy),
            None => call,
        }
    }
}

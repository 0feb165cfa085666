//! Hub configuration as served by `/api/config`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::HubTimeZone;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub elevation: Option<f64>,
    /// IANA zone name, e.g. `Europe/Berlin`.
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub unit_system: HashMap<String, String>,
}

impl HubConfig {
    /// Whether the hub has loaded `component` (e.g. `device_tracker`).
    #[must_use]
    pub fn has_component(&self, component: &str) -> bool {
        self.components.iter().any(|c| c == component)
    }

    /// Resolve the hub's time zone.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownTimeZone`] when the hub reports a zone
    /// that is not a known IANA identifier.
    pub fn time_zone(&self) -> Result<HubTimeZone, ValidationError> {
        HubTimeZone::resolve(self.time_zone.as_deref())
    }
}

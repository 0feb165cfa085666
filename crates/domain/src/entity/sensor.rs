//! Read-mostly value entities: sensors, the sun, input helpers, weblinks.

use serde::{Deserialize, Serialize};

use super::attribute_value::{AttributeLookup, Attributes};
use crate::time::{Timestamp, TimestampTransform};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    /// The state read as a number, when it is one.
    pub value: Option<f64>,
    pub unit: Option<String>,
}

impl Sensor {
    #[must_use]
    pub fn from_state(state: &str, attributes: &Attributes) -> Self {
        Self {
            value: state.trim().parse().ok(),
            unit: attributes.string_attr("unit_of_measurement"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sun {
    pub elevation: Option<f64>,
    pub next_rising: Option<Timestamp>,
    pub next_setting: Option<Timestamp>,
    pub is_above_horizon: bool,
}

impl Sun {
    #[must_use]
    pub fn from_state(state: &str, attributes: &Attributes, timestamps: &TimestampTransform) -> Self {
        let time = |key: &str| attributes.str_attr(key).and_then(|raw| timestamps.parse(raw));
        Self {
            elevation: attributes.f64_attr("elevation"),
            next_rising: time("next_rising"),
            next_setting: time("next_setting"),
            is_above_horizon: state == "above_horizon",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSelect {
    pub options: Vec<String>,
}

impl InputSelect {
    #[must_use]
    pub fn from_attributes(attributes: &Attributes) -> Self {
        Self {
            options: attributes.list_attr("options").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSlider {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub value: Option<f64>,
}

impl InputSlider {
    #[must_use]
    pub fn from_state(state: &str, attributes: &Attributes) -> Self {
        Self {
            min: attributes.f64_attr("min"),
            max: attributes.f64_attr("max"),
            step: attributes.f64_attr("step"),
            value: state.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weblink {
    pub url: String,
}

impl Weblink {
    #[must_use]
    pub fn from_state(state: &str) -> Self {
        Self {
            url: state.to_string(),
        }
    }
}

//! Climate and legacy thermostat details.

use serde::{Deserialize, Serialize};

use super::attribute_value::{AttributeLookup, Attributes};
use crate::transform::ON_OFF;

/// HVAC device state.
///
/// `swing_mode`, `aux_heat` and `away_mode` travel as `on`/`off` tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Climate {
    pub current_temperature: Option<f64>,
    pub temperature: Option<f64>,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub current_humidity: Option<f64>,
    pub humidity: Option<f64>,
    pub min_humidity: Option<f64>,
    pub max_humidity: Option<f64>,
    pub fan_mode: Option<String>,
    pub fan_list: Vec<String>,
    pub operation_mode: Option<String>,
    pub operation_list: Vec<String>,
    pub swing_mode: Option<bool>,
    pub swing_list: Vec<String>,
    pub aux_heat: Option<bool>,
    pub away_mode: Option<bool>,
}

impl Climate {
    #[must_use]
    pub fn from_attributes(attributes: &Attributes) -> Self {
        Self {
            current_temperature: attributes.f64_attr("current_temperature"),
            temperature: attributes.f64_attr("temperature"),
            min_temp: attributes.f64_attr("min_temp"),
            max_temp: attributes.f64_attr("max_temp"),
            current_humidity: attributes.f64_attr("current_humidity"),
            humidity: attributes.f64_attr("humidity"),
            min_humidity: attributes.f64_attr("min_humidity"),
            max_humidity: attributes.f64_attr("max_humidity"),
            fan_mode: attributes.string_attr("fan_mode"),
            fan_list: attributes.list_attr("fan_list").unwrap_or_default(),
            operation_mode: attributes.string_attr("operation_mode"),
            operation_list: attributes.list_attr("operation_list").unwrap_or_default(),
            swing_mode: attributes.toggle_attr("swing_mode", ON_OFF),
            swing_list: attributes.list_attr("swing_list").unwrap_or_default(),
            aux_heat: attributes.toggle_attr("aux_heat", ON_OFF),
            away_mode: attributes.toggle_attr("away_mode", ON_OFF),
        }
    }
}

/// Pre-climate thermostat component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Thermostat {
    pub current_temperature: Option<f64>,
    pub temperature: Option<f64>,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub away_mode: Option<bool>,
    pub is_fan_on: Option<bool>,
}

impl Thermostat {
    #[must_use]
    pub fn from_attributes(attributes: &Attributes) -> Self {
        Self {
            current_temperature: attributes.f64_attr("current_temperature"),
            temperature: attributes.f64_attr("temperature"),
            min_temp: attributes.f64_attr("min_temp"),
            max_temp: attributes.f64_attr("max_temp"),
            away_mode: attributes.toggle_attr("away_mode", ON_OFF),
            is_fan_on: attributes.toggle_attr("fan", ON_OFF),
        }
    }
}

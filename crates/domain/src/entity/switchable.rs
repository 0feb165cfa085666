//! Details for two-valued domains: switches, lights, fans, locks, doors.

use serde::{Deserialize, Serialize};

use super::attribute_value::{AttributeLookup, AttributeValue, Attributes};
use crate::transform::{LOCKED_UNLOCKED, ON_OFF, OPEN_CLOSED};

/// On/off state shared by binary sensors, switches, input booleans, scripts
/// and automations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
    pub is_on: bool,
}

impl Toggle {
    #[must_use]
    pub fn from_state(state: &str) -> Self {
        Self {
            is_on: ON_OFF.from_wire(state),
        }
    }
}

/// A dimmable, possibly colored light.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub is_on: bool,
    /// 0 to 255.
    pub brightness: Option<u8>,
    pub rgb_color: Option<[u8; 3]>,
    pub color_temp: Option<f64>,
    pub supported_features: Option<i64>,
}

impl Light {
    #[must_use]
    pub fn from_state(state: &str, attributes: &Attributes) -> Self {
        Self {
            is_on: ON_OFF.from_wire(state),
            brightness: attributes.f64_attr("brightness").map(clamp_channel),
            rgb_color: attributes
                .get("rgb_color")
                .and_then(AttributeValue::as_number_list)
                .and_then(|channels| match channels.as_slice() {
                    [r, g, b] => Some([clamp_channel(*r), clamp_channel(*g), clamp_channel(*b)]),
                    _ => None,
                }),
            color_temp: attributes.f64_attr("color_temp"),
            supported_features: attributes.i64_attr("supported_features"),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// A fan with optional speed selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fan {
    pub is_on: bool,
    pub speed: Option<String>,
    pub speed_list: Vec<String>,
    pub oscillating: Option<bool>,
}

impl Fan {
    #[must_use]
    pub fn from_state(state: &str, attributes: &Attributes) -> Self {
        Self {
            is_on: ON_OFF.from_wire(state),
            speed: attributes.string_attr("speed"),
            speed_list: attributes.list_attr("speed_list").unwrap_or_default(),
            oscillating: attributes.bool_attr("oscillating"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub is_locked: bool,
}

impl Lock {
    #[must_use]
    pub fn from_state(state: &str) -> Self {
        Self {
            is_locked: LOCKED_UNLOCKED.from_wire(state),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarageDoor {
    pub is_open: bool,
}

impl GarageDoor {
    #[must_use]
    pub fn from_state(state: &str) -> Self {
        Self {
            is_open: OPEN_CLOSED.from_wire(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(json: &str) -> Attributes {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn should_treat_anything_but_on_as_off() {
        assert!(Toggle::from_state("on").is_on);
        assert!(!Toggle::from_state("off").is_on);
        assert!(!Toggle::from_state("unavailable").is_on);
    }

    #[test]
    fn should_read_light_brightness_and_color() {
        let light = Light::from_state(
            "on",
            &attrs(r#"{"brightness": 180, "rgb_color": [255, 128.4, 0], "supported_features": 151}"#),
        );
        assert!(light.is_on);
        assert_eq!(light.brightness, Some(180));
        assert_eq!(light.rgb_color, Some([255, 128, 0]));
        assert_eq!(light.supported_features, Some(151));
        assert_eq!(light.color_temp, None);
    }

    #[test]
    fn should_clamp_out_of_range_brightness() {
        let light = Light::from_state("on", &attrs(r#"{"brightness": 300}"#));
        assert_eq!(light.brightness, Some(255));
    }

    #[test]
    fn should_ignore_malformed_rgb_color() {
        let light = Light::from_state("off", &attrs(r#"{"rgb_color": [1, 2]}"#));
        assert!(!light.is_on);
        assert_eq!(light.rgb_color, None);
    }

    #[test]
    fn should_read_fan_speed_list() {
        let fan = Fan::from_state(
            "on",
            &attrs(r#"{"speed": "low", "speed_list": ["low", "high"], "oscillating": true}"#),
        );
        assert_eq!(fan.speed.as_deref(), Some("low"));
        assert_eq!(fan.speed_list, vec!["low", "high"]);
        assert_eq!(fan.oscillating, Some(true));
    }

    #[test]
    fn should_decode_lock_and_garage_door_tokens() {
        assert!(Lock::from_state("locked").is_locked);
        assert!(!Lock::from_state("unlocked").is_locked);
        assert!(GarageDoor::from_state("open").is_open);
        assert!(!GarageDoor::from_state("closed").is_open);
    }
}

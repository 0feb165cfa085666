//! Positioned entities: device trackers and zones.

use serde::{Deserialize, Serialize};

use super::attribute_value::{AttributeLookup, AttributeValue, Attributes};
use crate::transform::HOME_NOT_HOME;

/// WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

fn coordinate(latitude: Option<f64>, longitude: Option<f64>) -> Option<Coordinate> {
    Some(Coordinate {
        latitude: latitude?,
        longitude: longitude?,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceTracker {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub gps_accuracy: Option<f64>,
    pub battery: Option<f64>,
    pub is_home: bool,
}

impl DeviceTracker {
    #[must_use]
    pub fn from_state(state: &str, attributes: &Attributes) -> Self {
        Self {
            latitude: attributes.f64_attr("latitude"),
            longitude: attributes.f64_attr("longitude"),
            gps_accuracy: attributes.f64_attr("gps_accuracy"),
            battery: attributes.f64_attr("battery"),
            is_home: HOME_NOT_HOME.from_wire(state),
        }
    }

    /// Present only when both latitude and longitude are known.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        coordinate(self.latitude, self.longitude)
    }
}

/// A named circular region, optionally backed by an iBeacon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Meters.
    pub radius: Option<f64>,
    pub passive: bool,
    pub beacon_uuid: Option<String>,
    pub beacon_major: Option<i64>,
    pub beacon_minor: Option<i64>,
    pub tracking_enabled: bool,
}

impl Default for Zone {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            radius: None,
            passive: false,
            beacon_uuid: None,
            beacon_major: None,
            beacon_minor: None,
            tracking_enabled: true,
        }
    }
}

impl Zone {
    #[must_use]
    pub fn from_attributes(attributes: &Attributes) -> Self {
        let beacon = |key: &str| {
            attributes
                .get("beacon")
                .and_then(|value| match value {
                    AttributeValue::Json(serde_json::Value::Object(map)) => {
                        map.get(key).cloned()
                    }
                    _ => None,
                })
        };
        Self {
            latitude: attributes.f64_attr("latitude"),
            longitude: attributes.f64_attr("longitude"),
            radius: attributes.f64_attr("radius"),
            passive: attributes.bool_attr("passive").unwrap_or(false),
            beacon_uuid: beacon("uuid").and_then(|v| v.as_str().map(str::to_string)),
            beacon_major: beacon("major").and_then(|v| v.as_i64()),
            beacon_minor: beacon("minor").and_then(|v| v.as_i64()),
            tracking_enabled: attributes.bool_attr("track_ios").unwrap_or(true),
        }
    }

    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        coordinate(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(json: &str) -> Attributes {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn should_expose_coordinate_when_both_axes_present() {
        let tracker = DeviceTracker::from_state(
            "not_home",
            &attrs(r#"{"latitude": 40.0, "longitude": -75.0, "gps_accuracy": 12}"#),
        );
        assert_eq!(
            tracker.coordinate(),
            Some(Coordinate {
                latitude: 40.0,
                longitude: -75.0
            })
        );
        assert_eq!(tracker.gps_accuracy, Some(12.0));
        assert!(!tracker.is_home);
    }

    #[test]
    fn should_have_no_coordinate_when_longitude_missing() {
        let tracker = DeviceTracker::from_state("home", &attrs(r#"{"latitude": 40.0}"#));
        assert_eq!(tracker.coordinate(), None);
        assert!(tracker.is_home);
    }

    #[test]
    fn should_read_zone_with_beacon() {
        let zone = Zone::from_attributes(&attrs(
            r#"{
                "latitude": 52.5,
                "longitude": 13.4,
                "radius": 100,
                "passive": true,
                "beacon": {"uuid": "E2C56DB5", "major": 1, "minor": 42}
            }"#,
        ));
        assert_eq!(zone.radius, Some(100.0));
        assert!(zone.passive);
        assert_eq!(zone.beacon_uuid.as_deref(), Some("E2C56DB5"));
        assert_eq!(zone.beacon_major, Some(1));
        assert_eq!(zone.beacon_minor, Some(42));
        assert!(zone.tracking_enabled);
        assert!(zone.coordinate().is_some());
    }

    #[test]
    fn should_honour_disabled_tracking() {
        let zone = Zone::from_attributes(&attrs(r#"{"track_ios": false}"#));
        assert!(!zone.tracking_enabled);
        assert!(!zone.passive);
    }
}

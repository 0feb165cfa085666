//! Media player details.

use serde::{Deserialize, Serialize};

use super::attribute_value::{AttributeLookup, Attributes};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaPlayer {
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_idle: bool,
    pub is_off: bool,
    /// 0.0 to 1.0.
    pub volume_level: Option<f64>,
    pub is_volume_muted: Option<bool>,
    pub source: Option<String>,
    pub source_list: Vec<String>,
    pub media_title: Option<String>,
    pub media_artist: Option<String>,
    pub media_content_type: Option<String>,
    /// Seconds.
    pub media_duration: Option<f64>,
}

impl MediaPlayer {
    #[must_use]
    pub fn from_state(state: &str, attributes: &Attributes) -> Self {
        Self {
            is_playing: state == "playing",
            is_paused: state == "paused",
            is_idle: state == "idle",
            is_off: state == "off",
            volume_level: attributes.f64_attr("volume_level"),
            is_volume_muted: attributes.bool_attr("is_volume_muted"),
            source: attributes.string_attr("source"),
            source_list: attributes.list_attr("source_list").unwrap_or_default(),
            media_title: attributes.string_attr("media_title"),
            media_artist: attributes.string_attr("media_artist"),
            media_content_type: attributes.string_attr("media_content_type"),
            media_duration: attributes.f64_attr("media_duration"),
        }
    }
}

//! Time and timestamp helpers.
//!
//! The hub sends state timestamps as `yyyy-MM-dd'T'HH:mm:ss.SSSZ` and some
//! event timestamps as `HH:mm:ss dd-MM-yyyy`. Strings without an explicit
//! offset are read in the hub's time zone, resolved once when the
//! [`TimestampTransform`] is built.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;

/// UTC timestamp used for `last_changed`, `last_updated`, event times, etc.
pub type Timestamp = DateTime<Utc>;

/// Primary state timestamp format (offset included).
pub const STATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";
const STATE_FORMAT_NAIVE: &str = "%Y-%m-%dT%H:%M:%S%.f";
/// Secondary format used by some event payloads (no offset).
pub const EVENT_FORMAT: &str = "%H:%M:%S %d-%m-%Y";
const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Zone used to interpret timestamps that carry no offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HubTimeZone {
    /// The zone of the machine running homesync.
    #[default]
    Local,
    /// A named IANA zone communicated by the hub (`time_zone` setting).
    Named(Tz),
}

impl HubTimeZone {
    /// Resolve the persisted `time_zone` setting.
    ///
    /// Absent or blank settings resolve to [`HubTimeZone::Local`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownTimeZone`] when the identifier is not
    /// a known IANA zone.
    pub fn resolve(setting: Option<&str>) -> Result<Self, ValidationError> {
        match setting.map(str::trim) {
            None | Some("") => Ok(Self::Local),
            Some(name) => name
                .parse::<Tz>()
                .map(Self::Named)
                .map_err(|_| ValidationError::UnknownTimeZone(name.to_string())),
        }
    }

    fn localize(self, naive: NaiveDateTime) -> Option<Timestamp> {
        match self {
            Self::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Self::Named(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Parses and formats hub timestamps in a fixed zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampTransform {
    zone: HubTimeZone,
}

impl TimestampTransform {
    #[must_use]
    pub fn new(zone: HubTimeZone) -> Self {
        Self { zone }
    }

    #[must_use]
    pub fn zone(&self) -> HubTimeZone {
        self.zone
    }

    /// Parse a state timestamp (`last_changed`, `last_updated`, …).
    #[must_use]
    pub fn parse(&self, raw: &str) -> Option<Timestamp> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.to_utc());
        }
        if let Ok(dt) = DateTime::parse_from_str(raw, STATE_FORMAT) {
            return Some(dt.to_utc());
        }
        NaiveDateTime::parse_from_str(raw, STATE_FORMAT_NAIVE)
            .ok()
            .and_then(|naive| self.zone.localize(naive))
    }

    /// Parse an event timestamp, trying the event format before the state one.
    #[must_use]
    pub fn parse_event_time(&self, raw: &str) -> Option<Timestamp> {
        NaiveDateTime::parse_from_str(raw, EVENT_FORMAT)
            .ok()
            .and_then(|naive| self.zone.localize(naive))
            .or_else(|| self.parse(raw))
    }

    /// Format a timestamp in the primary wire format, in UTC.
    #[must_use]
    pub fn format(&self, ts: Timestamp) -> String {
        ts.format(WIRE_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn berlin() -> TimestampTransform {
        TimestampTransform::new(HubTimeZone::resolve(Some("Europe/Berlin")).unwrap())
    }

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_resolve_missing_setting_to_local() {
        assert_eq!(HubTimeZone::resolve(None).unwrap(), HubTimeZone::Local);
        assert_eq!(HubTimeZone::resolve(Some("  ")).unwrap(), HubTimeZone::Local);
    }

    #[test]
    fn should_resolve_named_zone() {
        let zone = HubTimeZone::resolve(Some("America/New_York")).unwrap();
        assert_eq!(zone, HubTimeZone::Named(chrono_tz::America::New_York));
    }

    #[test]
    fn should_reject_unknown_zone() {
        let result = HubTimeZone::resolve(Some("Mars/Olympus"));
        assert_eq!(
            result,
            Err(ValidationError::UnknownTimeZone("Mars/Olympus".to_string()))
        );
    }

    #[test]
    fn should_parse_millisecond_timestamp_with_compact_offset() {
        let ts = berlin().parse("2016-04-05T12:30:15.250+0200").unwrap();
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.minute(), 30);
        assert_eq!(ts.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn should_parse_microsecond_timestamp_with_colon_offset() {
        let ts = berlin().parse("2016-04-05T12:30:15.123456+00:00").unwrap();
        assert_eq!(ts.hour(), 12);
        assert_eq!(ts.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn should_interpret_offsetless_timestamp_in_configured_zone() {
        let ts = berlin().parse("2016-01-05T12:00:00.000").unwrap();
        // Berlin is UTC+1 in winter.
        assert_eq!(ts.hour(), 11);
    }

    #[test]
    fn should_parse_event_time_format_in_configured_zone() {
        let ts = berlin().parse_event_time("08:15:00 20-07-2017").unwrap();
        // Berlin is UTC+2 in summer.
        assert_eq!(ts.hour(), 6);
        assert_eq!(ts.day(), 20);
        assert_eq!(ts.month(), 7);
    }

    #[test]
    fn should_fall_back_to_state_format_for_event_time() {
        let ts = berlin()
            .parse_event_time("2017-07-20T08:15:00.000+00:00")
            .unwrap();
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn should_return_none_for_garbage() {
        assert!(berlin().parse("yesterday").is_none());
        assert!(berlin().parse_event_time("").is_none());
    }

    #[test]
    fn should_format_in_primary_wire_format() {
        let transform = berlin();
        let ts = transform.parse("2016-04-05T12:30:15.250+00:00").unwrap();
        let text = transform.format(ts);
        assert_eq!(text, "2016-04-05T12:30:15.250+0000");
        assert_eq!(transform.parse(&text), Some(ts));
    }
}

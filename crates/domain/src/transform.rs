//! Pure, bidirectional mappings between wire strings and typed values.
//!
//! Decoding is permissive: anything that is not the `true` token decodes to
//! `false`. Encoding is defined for every boolean and passes `None` through.

use serde_json::Value;

/// A two-valued vocabulary such as `on`/`off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolTransform {
    pub true_token: &'static str,
    pub false_token: &'static str,
}

/// `on` / `off` — switches, lights, binary sensors, input booleans.
pub const ON_OFF: BoolTransform = BoolTransform::new("on", "off");
/// `open` / `closed` — garage doors and covers.
pub const OPEN_CLOSED: BoolTransform = BoolTransform::new("open", "closed");
/// `locked` / `unlocked` — locks.
pub const LOCKED_UNLOCKED: BoolTransform = BoolTransform::new("locked", "unlocked");
/// `home` / `not_home` — device trackers.
pub const HOME_NOT_HOME: BoolTransform = BoolTransform::new("home", "not_home");

impl BoolTransform {
    #[must_use]
    pub const fn new(true_token: &'static str, false_token: &'static str) -> Self {
        Self {
            true_token,
            false_token,
        }
    }

    /// Decode a wire string.
    #[must_use]
    pub fn from_wire(&self, value: &str) -> bool {
        value == self.true_token
    }

    /// Decode an optional JSON value; non-strings and absent values are `false`.
    #[must_use]
    pub fn from_value(&self, value: Option<&Value>) -> bool {
        value
            .and_then(Value::as_str)
            .is_some_and(|s| self.from_wire(s))
    }

    /// Encode a boolean.
    #[must_use]
    pub fn to_wire(&self, value: bool) -> &'static str {
        if value {
            self.true_token
        } else {
            self.false_token
        }
    }

    /// Encode an optional boolean; `None` stays `None`.
    #[must_use]
    pub fn to_wire_opt(&self, value: Option<bool>) -> Option<&'static str> {
        value.map(|v| self.to_wire(v))
    }
}

/// Domain prefix of an entity identifier (before the first `.`).
///
/// Identifiers without a `.` are returned unchanged.
#[must_use]
pub fn domain_of(entity_id: &str) -> &str {
    entity_id
        .split_once('.')
        .map_or(entity_id, |(domain, _)| domain)
}

/// Like [`domain_of`] but on an untyped JSON value; non-strings yield nothing.
#[must_use]
pub fn domain_from_value(value: &Value) -> Option<&str> {
    value.as_str().map(domain_of)
}

//! Typed attribute values attached to entities.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::transform::BoolTransform;

/// Attribute map as received from the hub.
pub type Attributes = HashMap<String, AttributeValue>;

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl AttributeValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view; integers widen, numeric strings are parsed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Integer view; floats with no fractional part are accepted.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A JSON array of strings (`fan_list`, `options`, `entity_id`, …).
    #[must_use]
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        match self {
            Self::Json(serde_json::Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            Self::String(s) => Some(vec![s.clone()]),
            _ => None,
        }
    }

    /// A JSON array of numbers (`rgb_color`, …).
    #[must_use]
    pub fn as_number_list(&self) -> Option<Vec<f64>> {
        match self {
            Self::Json(serde_json::Value::Array(items)) => {
                items.iter().map(serde_json::Value::as_f64).collect()
            }
            _ => None,
        }
    }
}

/// Typed lookups over an [`Attributes`] map.
///
/// Every lookup is lenient: a missing key or a value of the wrong shape
/// yields `None`, so component details fall back to their defaults.
pub trait AttributeLookup {
    fn str_attr(&self, key: &str) -> Option<&str>;
    fn f64_attr(&self, key: &str) -> Option<f64>;
    fn i64_attr(&self, key: &str) -> Option<i64>;
    fn bool_attr(&self, key: &str) -> Option<bool>;
    fn list_attr(&self, key: &str) -> Option<Vec<String>>;

    fn string_attr(&self, key: &str) -> Option<String> {
        self.str_attr(key).map(str::to_string)
    }

    /// Two-valued attribute such as `aux_heat: "on"`; JSON booleans pass as is.
    fn toggle_attr(&self, key: &str, transform: BoolTransform) -> Option<bool>;
}

impl AttributeLookup for Attributes {
    fn str_attr(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_str)
    }

    fn f64_attr(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(AttributeValue::as_f64)
    }

    fn i64_attr(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(AttributeValue::as_i64)
    }

    fn bool_attr(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AttributeValue::as_bool)
    }

    fn list_attr(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).and_then(AttributeValue::as_string_list)
    }

    fn toggle_attr(&self, key: &str, transform: BoolTransform) -> Option<bool> {
        match self.get(key)? {
            AttributeValue::Bool(b) => Some(*b),
            AttributeValue::String(s) => Some(transform.from_wire(s)),
            _ => None,
        }
    }
}

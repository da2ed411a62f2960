//! Key naming conventions
//!
//! Renames object keys between `kebab-case`, `snake_case` and `camelCase`.
//! Word boundaries are the existing separators (`-`, `_`) and camel humps, so
//! converting an ASCII identifier across conventions and back is lossless.

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A key naming convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCase {
    /// `lower-kebab-case`
    #[serde(rename = "kebab-case")]
    Kebab,
    /// `lower_snake_case`
    #[serde(rename = "snake_case")]
    Snake,
    /// `lowerCamelCase`
    #[serde(rename = "camelCase")]
    Camel,
}

impl KeyCase {
    /// The tag used for this convention in resource options
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kebab => "kebab-case",
            Self::Snake => "snake_case",
            Self::Camel => "camelCase",
        }
    }

    /// Rename a single key into this convention
    pub fn convert_key(&self, key: &str) -> String {
        match self {
            Self::Kebab => key.to_kebab_case(),
            Self::Snake => key.to_snake_case(),
            Self::Camel => key.to_lower_camel_case(),
        }
    }

    /// Recursively rename every key of `value`.
    ///
    /// Lists are mapped element-wise, objects have each key renamed and each
    /// list/object value converted in turn. A bare string is treated as a key
    /// and renamed directly. Other scalars are returned untouched.
    pub fn convert(&self, value: &Value) -> Value {
        match value {
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.convert_nested(v)).collect())
            }
            Value::Object(map) => Value::Object(self.convert_map(map)),
            Value::String(key) => Value::String(self.convert_key(key)),
            other => other.clone(),
        }
    }

    /// Rename every key of an object, recursing into nested lists and objects
    pub fn convert_map(&self, map: &Map<String, Value>) -> Map<String, Value> {
        map.iter()
            .map(|(key, value)| (self.convert_key(key), self.convert_nested(value)))
            .collect()
    }

    // Values nested inside a structure: strings here are data, not keys.
    fn convert_nested(&self, value: &Value) -> Value {
        match value {
            Value::Array(_) | Value::Object(_) => self.convert(value),
            other => other.clone(),
        }
    }
}

impl fmt::Display for KeyCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyCase {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "kebab-case" => Ok(Self::Kebab),
            "snake_case" => Ok(Self::Snake),
            "camelCase" => Ok(Self::Camel),
            other => Err(format!(
                "'{}' must be one of 'kebab-case', 'snake_case', 'camelCase'",
                other
            )),
        }
    }
}

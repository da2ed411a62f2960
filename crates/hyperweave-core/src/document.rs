//! JSON:API document model
//!
//! ```text
//! { jsonapi: { version: "1.0" },
//!   meta?, links?,
//!   data: ResourceObject | ResourceObject[] | null,
//!   included?: ResourceObject[] }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::Error;

/// Version advertised in every produced document
pub const JSONAPI_VERSION: &str = "1.0";

/// Top-level document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Implementation information
    #[serde(default)]
    pub jsonapi: JsonApiInfo,

    /// Top-level meta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,

    /// Top-level links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,

    /// Primary data
    #[serde(default)]
    pub data: PrimaryData,

    /// Linked resources, deduplicated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<ResourceObject>>,
}

impl Document {
    /// Render the document as a JSON value
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl TryFrom<Value> for Document {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(serde_json::from_value(value)?)
    }
}

/// The `jsonapi` member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonApiInfo {
    /// Specification version
    pub version: String,
}

impl Default for JsonApiInfo {
    fn default() -> Self {
        Self {
            version: JSONAPI_VERSION.to_string(),
        }
    }
}

/// Primary data: a single resource, a list, or null
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    /// `null`
    #[default]
    Null,
    /// A list of resources (possibly empty)
    Many(Vec<ResourceObject>),
    /// A single resource
    One(Box<ResourceObject>),
}

impl PrimaryData {
    /// The resources carried, in order
    pub fn resources(&self) -> Vec<&ResourceObject> {
        match self {
            Self::Null => Vec::new(),
            Self::Many(items) => items.iter().collect(),
            Self::One(item) => vec![item.as_ref()],
        }
    }

    /// Whether no resource is carried
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Many(items) => items.is_empty(),
            Self::One(_) => false,
        }
    }
}

/// A resource object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    /// Resource type
    #[serde(rename = "type")]
    pub type_name: String,

    /// Identifier; absent on creation payloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,

    /// Relationships keyed by (possibly case-converted) name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<IndexMap<String, Relationship>>,

    /// Resource links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,

    /// Resource meta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ResourceObject {
    /// The `{type, id}` stub referencing this resource, if it has an id
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        self.id
            .as_ref()
            .map(|id| ResourceIdentifier::new(self.type_name.clone(), id.clone()))
    }
}

/// A relationship object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Relationship {
    /// Resource linkage: `None` when the member is missing, `Some(None)` for `null`
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Option<Linkage>>,

    /// Relationship links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,

    /// Relationship meta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

// A member that is present deserializes to `Some`, even when it is `null`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Resource linkage of a relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    /// To-many linkage (possibly empty)
    Many(Vec<ResourceIdentifier>),
    /// To-one linkage
    One(ResourceIdentifier),
}

/// A linkage stub `{type, id}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    /// Resource type
    #[serde(rename = "type")]
    pub type_name: String,
    /// Identifier
    pub id: String,
}

impl ResourceIdentifier {
    /// Create a stub
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }
}

//! Resource options and their normalization
//!
//! Raw options arrive as JSON-compatible values (from code via `json!` or from
//! a YAML schema file). [`normalize`] validates their shape and fills in every
//! default, producing a [`ResourceConfig`].
//!
//! # Raw option keys
//!
//! ```yaml
//! id: _id                        # field holding the identifier (default: id)
//! blacklist: [updated]           # attributes never serialized
//! whitelist: [title, body]       # if non-empty, only these attributes
//! blacklist_on_deserialize: []   # fields dropped when deserializing
//! whitelist_on_deserialize: []   # if non-empty, only these fields kept
//! links: { self: /articles }
//! relationships:
//!   author:
//!     type: people               # required
//!     schema: default            # target variant
//!     alternative_key: author_id # fallback source field
//!     links: { related: /author }
//! top_level_links: { self: /articles }
//! top_level_meta: { version: 2 }
//! convert_case: kebab-case       # kebab-case | snake_case | camelCase
//! unconvert_case: camelCase
//! ```

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

use crate::case::KeyCase;
use crate::error::{Error, Result};
use crate::resolver::ValueSource;

/// Variant name used wherever one is omitted
pub const DEFAULT_VARIANT: &str = "default";

/// Field read as a record's identifier unless configured otherwise
pub const DEFAULT_ID_KEY: &str = "id";

const RESOURCE_KEYS: &[&str] = &[
    "id",
    "blacklist",
    "whitelist",
    "blacklist_on_deserialize",
    "whitelist_on_deserialize",
    "links",
    "relationships",
    "top_level_links",
    "top_level_meta",
    "convert_case",
    "unconvert_case",
];

const RELATIONSHIP_KEYS: &[&str] = &["type", "schema", "alternative_key", "links"];

/// Configuration of one relationship of a resource
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipConfig {
    /// Resource type of the linked records
    pub type_name: String,
    /// Variant of the target type used for included records
    pub schema: String,
    /// Field read when the relationship's own key is absent
    pub alternative_key: Option<String>,
    /// Relationship links, resolved against the parent record
    pub links: ValueSource,
}

impl RelationshipConfig {
    /// A relationship to `type_name` using its default variant
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            schema: DEFAULT_VARIANT.to_string(),
            alternative_key: None,
            links: ValueSource::empty(),
        }
    }

    /// Use a named variant of the target type
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Read linked records from `key` when the relationship key is absent
    pub fn with_alternative_key(mut self, key: impl Into<String>) -> Self {
        self.alternative_key = Some(key.into());
        self
    }

    /// Set the relationship links source
    pub fn with_links(mut self, links: ValueSource) -> Self {
        self.links = links;
        self
    }
}

/// Fully populated configuration of a resource type variant
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceConfig {
    /// Field read as the record's identifier
    pub id_key: String,
    /// Attributes removed on output
    pub blacklist: IndexSet<String>,
    /// If non-empty, the only attributes kept on output
    pub whitelist: IndexSet<String>,
    /// Fields removed on input
    pub blacklist_on_deserialize: IndexSet<String>,
    /// If non-empty, the only fields kept on input
    pub whitelist_on_deserialize: IndexSet<String>,
    /// Relationships in declaration order
    pub relationships: IndexMap<String, RelationshipConfig>,
    /// Per-resource links
    pub links: ValueSource,
    /// Document links when this type is serialized at the top level
    pub top_level_links: ValueSource,
    /// Document meta when this type is serialized at the top level
    pub top_level_meta: ValueSource,
    /// Naming convention applied to attribute and relationship keys on output
    pub convert_case: Option<KeyCase>,
    /// Naming convention applied to record keys on input
    pub unconvert_case: Option<KeyCase>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            id_key: DEFAULT_ID_KEY.to_string(),
            blacklist: IndexSet::new(),
            whitelist: IndexSet::new(),
            blacklist_on_deserialize: IndexSet::new(),
            whitelist_on_deserialize: IndexSet::new(),
            relationships: IndexMap::new(),
            links: ValueSource::empty(),
            top_level_links: ValueSource::empty(),
            top_level_meta: ValueSource::empty(),
            convert_case: None,
            unconvert_case: None,
        }
    }
}

impl ResourceConfig {
    /// Validate raw options; see [`normalize`]
    pub fn from_options(raw: &Value) -> Result<Self> {
        normalize(raw)
    }

    /// Set the identifier field
    pub fn with_id_key(mut self, id_key: impl Into<String>) -> Self {
        self.id_key = id_key.into();
        self
    }

    /// Add or replace a relationship
    pub fn with_relationship(mut self, key: impl Into<String>, rel: RelationshipConfig) -> Self {
        self.relationships.insert(key.into(), rel);
        self
    }

    /// Set the per-resource links source
    pub fn with_links(mut self, links: ValueSource) -> Self {
        self.links = links;
        self
    }

    /// Add one entry to the per-resource links
    pub fn with_link(mut self, key: impl Into<String>, source: ValueSource) -> Self {
        self.links.insert(key, source);
        self
    }

    /// Set the top-level links source
    pub fn with_top_level_links(mut self, links: ValueSource) -> Self {
        self.top_level_links = links;
        self
    }

    /// Set the top-level meta source
    pub fn with_top_level_meta(mut self, meta: ValueSource) -> Self {
        self.top_level_meta = meta;
        self
    }

    /// Set the output naming convention
    pub fn with_convert_case(mut self, case: KeyCase) -> Self {
        self.convert_case = Some(case);
        self
    }

    /// Set the input naming convention
    pub fn with_unconvert_case(mut self, case: KeyCase) -> Self {
        self.unconvert_case = Some(case);
        self
    }

    /// Whether `key` names a relationship field or its alternative key
    pub(crate) fn is_relationship_field(&self, key: &str) -> bool {
        self.relationships.contains_key(key)
            || self
                .relationships
                .values()
                .any(|rel| rel.alternative_key.as_deref() == Some(key))
    }
}

/// Validate raw resource options and apply defaults.
///
/// `null` is accepted and yields the default configuration. The first shape
/// violation is reported as [`Error::Configuration`] with the option's path.
pub fn normalize(raw: &Value) -> Result<ResourceConfig> {
    let obj = match raw {
        Value::Null => return Ok(ResourceConfig::default()),
        Value::Object(obj) => obj,
        _ => return Err(Error::configuration("", "options must be an object")),
    };
    reject_unknown_keys(obj, RESOURCE_KEYS, "")?;

    let mut config = ResourceConfig::default();

    if let Some(id) = obj.get("id") {
        config.id_key = expect_string(id, "id")?;
    }
    config.blacklist = string_set(obj.get("blacklist"), "blacklist")?;
    config.whitelist = string_set(obj.get("whitelist"), "whitelist")?;
    config.blacklist_on_deserialize =
        string_set(obj.get("blacklist_on_deserialize"), "blacklist_on_deserialize")?;
    config.whitelist_on_deserialize =
        string_set(obj.get("whitelist_on_deserialize"), "whitelist_on_deserialize")?;
    config.links = literal_source(obj.get("links"), "links")?;
    config.top_level_links = literal_source(obj.get("top_level_links"), "top_level_links")?;
    config.top_level_meta = literal_source(obj.get("top_level_meta"), "top_level_meta")?;
    config.convert_case = key_case(obj.get("convert_case"), "convert_case")?;
    config.unconvert_case = key_case(obj.get("unconvert_case"), "unconvert_case")?;

    match obj.get("relationships") {
        None | Some(Value::Null) => {}
        Some(Value::Object(rels)) => {
            for (key, rel) in rels {
                let path = format!("relationships.{}", key);
                config
                    .relationships
                    .insert(key.clone(), normalize_relationship(rel, &path)?);
            }
        }
        Some(_) => return Err(Error::configuration("relationships", "must be an object")),
    }

    Ok(config)
}

fn normalize_relationship(raw: &Value, path: &str) -> Result<RelationshipConfig> {
    let obj = raw
        .as_object()
        .ok_or_else(|| Error::configuration(path, "must be an object"))?;
    reject_unknown_keys(obj, RELATIONSHIP_KEYS, path)?;

    let type_path = format!("{}.type", path);
    let type_name = match obj.get("type") {
        Some(value) => expect_string(value, &type_path)?,
        None => return Err(Error::configuration(type_path, "is required")),
    };
    if type_name.is_empty() {
        return Err(Error::configuration(type_path, "must not be empty"));
    }

    let mut rel = RelationshipConfig::new(type_name);
    if let Some(schema) = obj.get("schema") {
        rel.schema = expect_string(schema, &format!("{}.schema", path))?;
    }
    if let Some(key) = obj.get("alternative_key") {
        rel.alternative_key = Some(expect_string(key, &format!("{}.alternative_key", path))?);
    }
    rel.links = literal_source(obj.get("links"), &format!("{}.links", path))?;
    Ok(rel)
}

fn reject_unknown_keys(obj: &Map<String, Value>, allowed: &[&str], path: &str) -> Result<()> {
    match obj.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(Error::configuration(join_path(path, key), "is not allowed")),
        None => Ok(()),
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn expect_string(value: &Value, path: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::configuration(path, "must be a string"))
}

/// A single string is accepted as a one-element list.
fn string_set(value: Option<&Value>, path: &str) -> Result<IndexSet<String>> {
    match value {
        None | Some(Value::Null) => Ok(IndexSet::new()),
        Some(Value::String(s)) => Ok(IndexSet::from([s.clone()])),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| expect_string(item, &format!("{}[{}]", path, i)))
            .collect(),
        Some(_) => Err(Error::configuration(
            path,
            "must be a string or a list of strings",
        )),
    }
}

fn literal_source(value: Option<&Value>, path: &str) -> Result<ValueSource> {
    match value {
        None | Some(Value::Null) => Ok(ValueSource::empty()),
        Some(Value::Object(map)) => Ok(ValueSource::mapping(
            map.iter()
                .map(|(k, v)| (k.clone(), ValueSource::Literal(v.clone()))),
        )),
        Some(_) => Err(Error::configuration(path, "must be an object")),
    }
}

fn key_case(value: Option<&Value>, path: &str) -> Result<Option<KeyCase>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(tag)) => tag
            .parse::<KeyCase>()
            .map(Some)
            .map_err(|message: String| Error::configuration(path, message)),
        Some(_) => Err(Error::configuration(path, "must be a string")),
    }
}

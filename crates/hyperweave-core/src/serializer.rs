//! Serialization engine
//!
//! Turns domain records (`serde_json::Value` objects) into a JSON:API
//! [`Document`]. Populated relationship values are serialized against the
//! relationship's target configuration and hoisted into `included`; bare
//! identifiers only produce `{type, id}` linkage.
//!
//! The work of one call lives in a [`SerializeCall`], which owns the
//! accumulated `included` list. [`Serializer`] drives it synchronously;
//! `hyperweave-runtime` drives the same call with cooperative yields.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::document::{
    Document, JsonApiInfo, Linkage, PrimaryData, Relationship, ResourceIdentifier, ResourceObject,
};
use crate::error::Result;
use crate::options::{RelationshipConfig, ResourceConfig};
use crate::registry::Registry;
use crate::target::{CallOptions, DynamicType, ResourceTarget};

/// Shape of the caller's data
#[derive(Debug, Clone, Copy)]
pub enum DataShape<'a> {
    /// `null` or an empty object
    Empty,
    /// A single record
    One(&'a Value),
    /// A collection of records (possibly empty)
    Many(&'a [Value]),
}

impl<'a> DataShape<'a> {
    /// Classify caller data
    pub fn of(data: &'a Value) -> Self {
        match data {
            Value::Array(items) => Self::Many(items),
            value if is_empty_value(value) => Self::Empty,
            value => Self::One(value),
        }
    }
}

/// Synchronous serializer over a registry
#[derive(Debug, Clone, Copy)]
pub struct Serializer<'r> {
    registry: &'r Registry,
}

impl<'r> Serializer<'r> {
    /// Create a serializer reading configurations from `registry`
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Serialize one record or a collection of records into a document.
    ///
    /// `options` is a variant name, extra context (`serde_json::Value`), or a
    /// full [`CallOptions`].
    ///
    /// Empty (`null`, `{}`) and non-object entries of a collection are
    /// skipped rather than kept as `null`, so `data[i]` of the document only
    /// lines up with `input[i]` when the input has no such entries.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hyperweave_core::{Registry, Serializer};
    /// use serde_json::json;
    ///
    /// let registry = Registry::new();
    /// registry.register("article", &json!({"blacklist": ["updated"]}))?;
    ///
    /// let doc = Serializer::new(&registry).serialize(
    ///     "article",
    ///     &json!({"id": 1, "title": "Hello", "updated": "yesterday"}),
    ///     (),
    /// )?;
    /// let value = doc.to_value()?;
    /// assert_eq!(value["data"]["id"], "1");
    /// assert!(value["data"]["attributes"].get("updated").is_none());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn serialize(
        &self,
        target: impl Into<ResourceTarget>,
        data: &Value,
        options: impl Into<CallOptions>,
    ) -> Result<Document> {
        let target = target.into();
        let options = options.into();
        let mut call = SerializeCall::new(self.registry, &target, &options)?;

        let primary = match DataShape::of(data) {
            DataShape::Empty => PrimaryData::Null,
            DataShape::One(record) => match call.resource(record)? {
                Some(resource) => PrimaryData::One(Box::new(resource)),
                None => PrimaryData::Null,
            },
            DataShape::Many(records) => {
                let mut resources = Vec::with_capacity(records.len());
                for record in records {
                    resources.extend(call.resource(record)?);
                }
                PrimaryData::Many(resources)
            }
        };

        Ok(call.finish(data, primary))
    }
}

/// Working state of one serialize call
#[derive(Debug)]
pub struct SerializeCall<'a> {
    registry: &'a Registry,
    target: CallTarget<'a>,
    options: &'a CallOptions,
    included: Vec<ResourceObject>,
}

#[derive(Debug)]
enum CallTarget<'a> {
    Fixed {
        type_name: &'a str,
        config: Arc<ResourceConfig>,
    },
    Dynamic(&'a DynamicType),
}

impl<'a> SerializeCall<'a> {
    /// Start a call. A fixed target type must already be registered under the
    /// requested variant.
    pub fn new(
        registry: &'a Registry,
        target: &'a ResourceTarget,
        options: &'a CallOptions,
    ) -> Result<Self> {
        let target = match target {
            ResourceTarget::Type(type_name) => CallTarget::Fixed {
                type_name,
                config: registry.lookup(type_name, &options.variant)?,
            },
            ResourceTarget::Dynamic(descriptor) => CallTarget::Dynamic(descriptor),
        };
        tracing::debug!(
            resource_type = %target_label(&target),
            variant = %options.variant,
            "starting serialize call"
        );
        Ok(Self {
            registry,
            target,
            options,
            included: Vec::new(),
        })
    }

    /// Serialize one top-level record; `None` for an empty record
    pub fn resource(&mut self, record: &Value) -> Result<Option<ResourceObject>> {
        if is_empty_value(record) {
            return Ok(None);
        }
        let (type_name, config) = match &self.target {
            CallTarget::Fixed { type_name, config } => {
                (type_name.to_string(), Arc::clone(config))
            }
            CallTarget::Dynamic(descriptor) => {
                let type_name = descriptor.resolve_type(record)?;
                let config = self
                    .registry
                    .lookup_dynamic(&type_name, &self.options.variant)?;
                (type_name, config)
            }
        };
        self.serialize_resource(&type_name, &config, record)
    }

    /// Number of included resources accumulated so far, duplicates counted
    pub fn included_len(&self) -> usize {
        self.included.len()
    }

    /// Assemble the top-level document.
    ///
    /// `data` is the caller's original input, handed to top-level value
    /// sources as the record alongside the extra context.
    pub fn finish(self, data: &Value, primary: PrimaryData) -> Document {
        let (links_source, meta_source) = match &self.target {
            CallTarget::Fixed { config, .. } => {
                (&config.top_level_links, &config.top_level_meta)
            }
            CallTarget::Dynamic(descriptor) => {
                (&descriptor.top_level_links, &descriptor.top_level_meta)
            }
        };
        let meta = meta_source.resolve(data, &self.options.extra);
        let links = links_source.resolve(data, &self.options.extra);

        let included = if primary.is_empty() {
            None
        } else {
            dedupe(self.included)
        };

        Document {
            jsonapi: JsonApiInfo::default(),
            meta,
            links,
            data: primary,
            included,
        }
    }

    fn serialize_resource(
        &mut self,
        type_name: &str,
        config: &ResourceConfig,
        record: &Value,
    ) -> Result<Option<ResourceObject>> {
        let Some(obj) = record.as_object().filter(|obj| !obj.is_empty()) else {
            if !record.is_null() {
                tracing::warn!(type_name, "skipping non-object record");
            }
            return Ok(None);
        };

        let id = obj.get(&config.id_key).and_then(stringify_id);
        let attributes = serialize_attributes(obj, config);
        let relationships = self.serialize_relationships(type_name, obj, record, config)?;
        let links = config.links.resolve(record, &self.options.extra);

        Ok(Some(ResourceObject {
            type_name: type_name.to_string(),
            id,
            attributes: Some(attributes),
            relationships,
            links,
            meta: None,
        }))
    }

    fn serialize_relationships(
        &mut self,
        type_name: &str,
        obj: &Map<String, Value>,
        record: &Value,
        config: &ResourceConfig,
    ) -> Result<Option<IndexMap<String, Relationship>>> {
        let mut relationships = IndexMap::new();

        for (key, rel) in &config.relationships {
            let Some(value) = relationship_value(obj, key, rel) else {
                continue;
            };
            tracing::trace!(type_name, relationship = %key, "serializing relationship");

            let target = self.registry.lookup_relationship(key, rel)?;
            let data = self.linkage(&rel.type_name, &target, value)?;
            let name = match config.convert_case {
                Some(case) => case.convert_key(key),
                None => key.clone(),
            };
            relationships.insert(
                name,
                Relationship {
                    data: Some(data),
                    links: rel.links.resolve(record, &self.options.extra),
                    meta: None,
                },
            );
        }

        Ok((!relationships.is_empty()).then_some(relationships))
    }

    fn linkage(
        &mut self,
        type_name: &str,
        target: &ResourceConfig,
        value: &Value,
    ) -> Result<Option<Linkage>> {
        if let Value::Array(items) = value {
            let mut stubs = Vec::with_capacity(items.len());
            for item in items {
                stubs.extend(self.link_one(type_name, target, item)?);
            }
            return Ok(Some(Linkage::Many(stubs)));
        }
        Ok(self.link_one(type_name, target, value)?.map(Linkage::One))
    }

    fn link_one(
        &mut self,
        type_name: &str,
        target: &ResourceConfig,
        value: &Value,
    ) -> Result<Option<ResourceIdentifier>> {
        if is_empty_value(value) || value.as_str() == Some("") {
            return Ok(None);
        }
        let Some(obj) = value.as_object().filter(|obj| !is_object_id(obj)) else {
            // Unpopulated: a bare identifier
            return Ok(stringify_id(value).map(|id| ResourceIdentifier::new(type_name, id)));
        };

        let Some(id) = obj.get(&target.id_key).and_then(stringify_id) else {
            tracing::warn!(
                type_name,
                id_key = %target.id_key,
                "populated relationship record has no id"
            );
            return Ok(None);
        };
        if let Some(resource) = self.serialize_resource(type_name, target, value)? {
            self.included.push(resource);
        }
        Ok(Some(ResourceIdentifier::new(type_name, id)))
    }
}

fn target_label<'a>(target: &CallTarget<'a>) -> &'a str {
    match target {
        CallTarget::Fixed { type_name, .. } => type_name,
        CallTarget::Dynamic(_) => "<dynamic>",
    }
}

/// Own key first; the alternative key only when the own key is absent or null.
fn relationship_value<'v>(
    obj: &'v Map<String, Value>,
    key: &str,
    rel: &RelationshipConfig,
) -> Option<&'v Value> {
    let own = obj.get(key);
    match (own, &rel.alternative_key) {
        (Some(value), _) if !value.is_null() => Some(value),
        (_, Some(alternative)) => obj.get(alternative).or(own),
        _ => own,
    }
}

fn serialize_attributes(obj: &Map<String, Value>, config: &ResourceConfig) -> Map<String, Value> {
    let attributes: Map<String, Value> = obj
        .iter()
        .filter(|(key, _)| config.whitelist.is_empty() || config.whitelist.contains(key.as_str()))
        .filter(|(key, _)| {
            key.as_str() != config.id_key
                && !config.is_relationship_field(key)
                && !config.blacklist.contains(key.as_str())
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    match config.convert_case {
        Some(case) => case.convert_map(&attributes),
        None => attributes,
    }
}

/// Keeps the first of every group of structurally equal resources.
fn dedupe(included: Vec<ResourceObject>) -> Option<Vec<ResourceObject>> {
    let mut unique: Vec<ResourceObject> = Vec::with_capacity(included.len());
    for resource in included {
        if !unique.contains(&resource) {
            unique.push(resource);
        }
    }
    (!unique.is_empty()).then_some(unique)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(obj) => obj.is_empty(),
        _ => false,
    }
}

// MongoDB extended JSON identifier: {"$oid": "..."}
fn is_object_id(obj: &Map<String, Value>) -> bool {
    obj.len() == 1 && obj.get("$oid").is_some_and(Value::is_string)
}

/// Canonical string form of an identifier value
pub fn stringify_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) if is_object_id(obj) => obj
            .get("$oid")
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Null => None,
        other => {
            tracing::warn!(value = %other, "identifier cannot be converted to a string");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::KeyCase;
    use crate::error::Error;
    use crate::resolver::ValueSource;
    use serde_json::json;

    fn registry() -> Registry {
        let registry = Registry::new();
        registry
            .register(
                "article",
                &json!({
                    "blacklist": ["updated"],
                    "relationships": {
                        "author": {"type": "people"},
                        "tags": {"type": "tag"},
                        "comments": {"type": "comment", "schema": "only-body"}
                    }
                }),
            )
            .unwrap();
        registry.register("people", &json!({})).unwrap();
        registry.register("tag", &json!({})).unwrap();
        registry
            .register_variant("comment", "only-body", &json!({"id": "_id", "whitelist": ["body"]}))
            .unwrap();
        registry
    }

    fn serialize(registry: &Registry, target: &str, data: Value) -> Value {
        Serializer::new(registry)
            .serialize(target, &data, ())
            .unwrap()
            .to_value()
            .unwrap()
    }

    #[test]
    fn test_empty_single_is_null() {
        let registry = registry();
        let doc = serialize(&registry, "article", json!({}));
        assert_eq!(doc["data"], Value::Null);
        assert!(doc.get("included").is_none());
        assert_eq!(doc["jsonapi"]["version"], "1.0");
    }

    #[test]
    fn test_empty_collection_is_empty_list() {
        let registry = registry();
        let doc = serialize(&registry, "article", json!([]));
        assert_eq!(doc["data"], json!([]));
        assert!(doc.get("included").is_none());
        assert!(doc.get("meta").is_none());
        assert!(doc.get("links").is_none());
    }

    #[test]
    fn test_empty_entries_in_collection_are_skipped() {
        let registry = registry();
        let doc = serialize(&registry, "article", json!([{"id": 1}, {}, null, {"id": 2}]));
        let data = doc["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["id"], "1");
        assert_eq!(data[1]["id"], "2");
    }

    #[test]
    fn test_single_record_attributes() {
        let registry = registry();
        let doc = serialize(
            &registry,
            "article",
            json!({"id": 1, "title": "Hello", "body": "World", "updated": "2016"}),
        );
        assert_eq!(
            doc["data"],
            json!({"type": "article", "id": "1", "attributes": {"title": "Hello", "body": "World"}})
        );
    }

    #[test]
    fn test_missing_id_is_omitted() {
        let registry = registry();
        let doc = serialize(&registry, "article", json!({"title": "Draft"}));
        assert!(doc["data"].get("id").is_none());
        assert_eq!(doc["data"]["attributes"]["title"], "Draft");
    }

    #[test]
    fn test_object_id_is_stringified() {
        let registry = registry();
        let doc = serialize(
            &registry,
            "people",
            json!({"id": {"$oid": "5a9d1d3a8b1e7a3c2c8d1f00"}, "name": "Ana"}),
        );
        assert_eq!(doc["data"]["id"], "5a9d1d3a8b1e7a3c2c8d1f00");
    }

    #[test]
    fn test_whitelist_then_blacklist() {
        let registry = Registry::new();
        registry
            .register("article", &json!({"whitelist": ["title", "body"], "blacklist": ["body"]}))
            .unwrap();
        let doc = serialize(
            &registry,
            "article",
            json!({"id": "1", "title": "T", "body": "B", "created": "now"}),
        );
        assert_eq!(doc["data"]["attributes"], json!({"title": "T"}));
    }

    #[test]
    fn test_to_many_bare_ids() {
        let registry = registry();
        let doc = serialize(&registry, "article", json!({"id": "1", "tags": ["1", "2"]}));
        assert_eq!(
            doc["data"]["relationships"]["tags"]["data"],
            json!([{"type": "tag", "id": "1"}, {"type": "tag", "id": "2"}])
        );
        assert!(doc.get("included").is_none());
    }

    #[test]
    fn test_to_one_populated_with_numeric_id() {
        let registry = registry();
        let doc = serialize(
            &registry,
            "article",
            json!({"id": "1", "author": {"id": 7, "name": "Kaz"}}),
        );
        assert_eq!(
            doc["data"]["relationships"]["author"]["data"],
            json!({"type": "people", "id": "7"})
        );
        assert_eq!(
            doc["included"],
            json!([{"type": "people", "id": "7", "attributes": {"name": "Kaz"}}])
        );
    }

    #[test]
    fn test_relationship_value_states() {
        let registry = registry();
        let doc = serialize(
            &registry,
            "article",
            json!({"id": "1", "author": null, "tags": []}),
        );
        let relationships = &doc["data"]["relationships"];
        assert_eq!(relationships["author"], json!({"data": null}));
        assert_eq!(relationships["tags"], json!({"data": []}));
        assert!(relationships.get("comments").is_none());
    }

    #[test]
    fn test_no_relationships_key_when_none_present() {
        let registry = registry();
        let doc = serialize(&registry, "article", json!({"id": "1", "title": "T"}));
        assert!(doc["data"].get("relationships").is_none());
    }

    #[test]
    fn test_included_deduplicated() {
        let registry = registry();
        let doc = serialize(
            &registry,
            "article",
            json!([
                {"id": "1", "author": {"id": "9", "name": "Dan"}},
                {"id": "2", "author": {"id": "9", "name": "Dan"}},
            ]),
        );
        assert_eq!(doc["included"].as_array().unwrap().len(), 1);
        assert_eq!(doc["data"][1]["relationships"]["author"]["data"]["id"], "9");
    }

    #[test]
    fn test_relationship_variant_used_for_included() {
        let registry = registry();
        let doc = serialize(
            &registry,
            "article",
            json!({"id": "1", "comments": [{"_id": "c1", "body": "Nice", "created": "now"}]}),
        );
        assert_eq!(
            doc["included"][0],
            json!({"type": "comment", "id": "c1", "attributes": {"body": "Nice"}})
        );
    }

    #[test]
    fn test_alternative_key() {
        let registry = Registry::new();
        registry
            .register(
                "article",
                &json!({"relationships": {"author": {"type": "people", "alternative_key": "author_id"}}}),
            )
            .unwrap();
        registry.register("people", &json!({})).unwrap();

        let doc = serialize(&registry, "article", json!({"id": "1", "author_id": "3"}));
        assert_eq!(
            doc["data"]["relationships"]["author"]["data"],
            json!({"type": "people", "id": "3"})
        );
        assert!(doc["data"]["attributes"].get("author_id").is_none());

        let doc = serialize(
            &registry,
            "article",
            json!({"id": "1", "author": {"id": "4"}, "author_id": "3"}),
        );
        assert_eq!(doc["data"]["relationships"]["author"]["data"]["id"], "4");
    }

    #[test]
    fn test_convert_case_output() {
        let registry = Registry::new();
        registry
            .register(
                "article",
                &json!({
                    "convert_case": "kebab-case",
                    "relationships": {"blogAuthor": {"type": "people"}}
                }),
            )
            .unwrap();
        registry.register("people", &json!({})).unwrap();

        let doc = serialize(
            &registry,
            "article",
            json!({"id": "1", "createdAt": "now", "meta_info": {"wordCount": 3}, "blogAuthor": "2"}),
        );
        assert_eq!(
            doc["data"]["attributes"],
            json!({"created-at": "now", "meta-info": {"word-count": 3}})
        );
        assert!(doc["data"]["relationships"].get("blog-author").is_some());
    }

    #[test]
    fn test_links_and_top_level_sources() {
        let registry = Registry::new();
        let config = ResourceConfig::default()
            .with_link(
                "self",
                ValueSource::computed(|r| Some(json!(format!("/articles/{}", r["id"])))),
            )
            .with_relationship(
                "author",
                RelationshipConfig::new("people").with_links(ValueSource::mapping([(
                    "related",
                    ValueSource::computed(|r| Some(json!(format!("/articles/{}/author", r["id"])))),
                )])),
            )
            .with_top_level_links(ValueSource::from(json!({"self": "/articles"})))
            .with_top_level_meta(ValueSource::mapping([(
                "count",
                ValueSource::with_context(|_, extra| extra.get("count").cloned()),
            )]));
        registry.register_config("article", "default", config);
        registry.register("people", &json!({})).unwrap();

        let doc = Serializer::new(&registry)
            .serialize("article", &json!([{"id": 1, "author": 2}]), json!({"count": 2}))
            .unwrap()
            .to_value()
            .unwrap();

        assert_eq!(doc["meta"], json!({"count": 2}));
        assert_eq!(doc["links"], json!({"self": "/articles"}));
        assert_eq!(doc["data"][0]["links"], json!({"self": "/articles/1"}));
        assert_eq!(
            doc["data"][0]["relationships"]["author"]["links"],
            json!({"related": "/articles/1/author"})
        );
    }

    #[test]
    fn test_unknown_type_and_variant() {
        let registry = registry();
        let serializer = Serializer::new(&registry);
        assert!(matches!(
            serializer.serialize("unknown", &json!({}), ()),
            Err(Error::UnknownType { .. })
        ));
        assert!(matches!(
            serializer.serialize("article", &json!({}), "summary"),
            Err(Error::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_unregistered_relationship_detected_lazily() {
        let registry = Registry::new();
        registry
            .register("article", &json!({"relationships": {"author": {"type": "people"}}}))
            .unwrap();
        let serializer = Serializer::new(&registry);

        assert!(serializer.serialize("article", &json!({"id": "1"}), ()).is_ok());
        assert!(matches!(
            serializer.serialize("article", &json!({"id": "1", "author": "2"}), ()),
            Err(Error::UnregisteredRelationshipType { .. })
        ));
    }

    #[test]
    fn test_dynamic_type() {
        let registry = registry();
        let records = json!([
            {"id": "1", "type": "article", "title": "A"},
            {"id": "2", "type": "people", "name": "P"},
        ]);
        let doc = Serializer::new(&registry)
            .serialize(DynamicType::field("type"), &records, ())
            .unwrap()
            .to_value()
            .unwrap();
        assert_eq!(doc["data"][0]["type"], "article");
        assert_eq!(doc["data"][1]["type"], "people");

        let with_unknown = json!([
            {"id": "1", "type": "article"},
            {"id": "3", "type": "video"},
        ]);
        assert!(matches!(
            Serializer::new(&registry).serialize(DynamicType::field("type"), &with_unknown, ()),
            Err(Error::UnregisteredType { ref type_name }) if type_name == "video"
        ));

        assert!(matches!(
            Serializer::new(&registry).serialize(DynamicType::field("type"), &json!({"id": "1"}), ()),
            Err(Error::UnresolvableType)
        ));
    }

    #[test]
    fn test_dynamic_type_top_level_sources() {
        let registry = registry();
        let descriptor = DynamicType::field("type")
            .with_top_level_meta(ValueSource::with_context(|data, _| {
                data.as_array().map(|items| json!({"total": items.len()}))
            }));
        let doc = Serializer::new(&registry)
            .serialize(descriptor, &json!([{"id": "1", "type": "tag"}]), ())
            .unwrap();
        assert_eq!(doc.meta, Some(json!({"total": 1})));
    }

    #[test]
    fn test_stringify_id_shapes() {
        assert_eq!(stringify_id(&json!("a")), Some("a".to_string()));
        assert_eq!(stringify_id(&json!(7)), Some("7".to_string()));
        assert_eq!(stringify_id(&json!({"$oid": "abc"})), Some("abc".to_string()));
        assert_eq!(stringify_id(&Value::Null), None);
        assert_eq!(stringify_id(&json!([1])), None);
    }

    #[test]
    fn test_key_case_applies_to_nested_included() {
        let registry = Registry::new();
        registry
            .register("article", &json!({"relationships": {"author": {"type": "people"}}}))
            .unwrap();
        registry
            .register_config("people", "default", ResourceConfig::default().with_convert_case(KeyCase::Snake));
        let doc = serialize(
            &registry,
            "article",
            json!({"id": "1", "author": {"id": "2", "firstName": "Ada"}}),
        );
        assert_eq!(doc["included"][0]["attributes"], json!({"first_name": "Ada"}));
    }
}

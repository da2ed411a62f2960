//! Deserialization engine
//!
//! Turns a JSON:API [`Document`] back into domain records. Relationship
//! linkage becomes bare identifiers, or the linked record itself when the
//! document's `included` list carries a matching `(type, id)` entry.
//!
//! Hydration goes exactly one hop: an included record is rebuilt from its own
//! attributes plus its relationship stubs as bare identifiers, and is never
//! expanded further. Mutually referencing included resources therefore cannot
//! cause unbounded recursion.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::document::{Document, Linkage, PrimaryData, ResourceIdentifier, ResourceObject};
use crate::error::Result;
use crate::options::{DEFAULT_VARIANT, RelationshipConfig, ResourceConfig};
use crate::registry::Registry;
use crate::target::{DynamicType, ResourceTarget};

/// Included resources keyed by `(type, id)`
pub type IncludedIndex<'a> = HashMap<ResourceIdentifier, &'a ResourceObject>;

/// Synchronous deserializer over a registry
#[derive(Debug, Clone, Copy)]
pub struct Deserializer<'r> {
    registry: &'r Registry,
}

impl<'r> Deserializer<'r> {
    /// Create a deserializer reading configurations from `registry`
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Deserialize a document's primary data.
    ///
    /// Returns `null` for `data: null`, an array for list data and an object
    /// for a single resource.
    pub fn deserialize(
        &self,
        target: impl Into<ResourceTarget>,
        document: &Document,
        variant: Option<&str>,
    ) -> Result<Value> {
        let target = target.into();
        let call = DeserializeCall::new(
            self.registry,
            &target,
            variant.unwrap_or(DEFAULT_VARIANT),
            document,
        )?;

        match &document.data {
            PrimaryData::Null => Ok(Value::Null),
            PrimaryData::One(resource) => call.resource(resource),
            PrimaryData::Many(resources) => resources
                .iter()
                .map(|resource| call.resource(resource))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
        }
    }
}

/// Working state of one deserialize call
#[derive(Debug)]
pub struct DeserializeCall<'a> {
    registry: &'a Registry,
    target: CallTarget<'a>,
    variant: &'a str,
    index: IncludedIndex<'a>,
}

#[derive(Debug)]
enum CallTarget<'a> {
    Fixed(Arc<ResourceConfig>),
    Dynamic(&'a DynamicType),
}

impl<'a> DeserializeCall<'a> {
    /// Start a call, indexing the document's `included` list once
    pub fn new(
        registry: &'a Registry,
        target: &'a ResourceTarget,
        variant: &'a str,
        document: &'a Document,
    ) -> Result<Self> {
        let target = match target {
            ResourceTarget::Type(type_name) => {
                CallTarget::Fixed(registry.lookup(type_name, variant)?)
            }
            ResourceTarget::Dynamic(descriptor) => CallTarget::Dynamic(descriptor),
        };
        let index = index_included(document);
        tracing::debug!(variant, included = index.len(), "starting deserialize call");
        Ok(Self {
            registry,
            target,
            variant,
            index,
        })
    }

    /// Deserialize one primary resource
    pub fn resource(&self, resource: &ResourceObject) -> Result<Value> {
        let config = match &self.target {
            CallTarget::Fixed(config) => Arc::clone(config),
            CallTarget::Dynamic(descriptor) => {
                let raw = serde_json::to_value(resource)?;
                let type_name = descriptor.resolve_type(&raw)?;
                self.registry.lookup_dynamic(&type_name, self.variant)?
            }
        };
        self.deserialize_resource(&config, resource, Some(&self.index))
    }

    fn deserialize_resource(
        &self,
        config: &ResourceConfig,
        resource: &ResourceObject,
        index: Option<&IncludedIndex<'a>>,
    ) -> Result<Value> {
        let mut record = Map::new();

        if let Some(id) = &resource.id {
            record.insert(config.id_key.clone(), Value::String(id.clone()));
        }
        if let Some(attributes) = &resource.attributes {
            record.extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        for (key, relationship) in resource.relationships.iter().flatten() {
            let Some(data) = &relationship.data else {
                continue;
            };
            let configured = relationship_config(config, key);
            let field = configured
                .and_then(|(_, rel)| rel.alternative_key.clone())
                .unwrap_or_else(|| key.clone());
            tracing::trace!(relationship = %key, field = %field, "deserializing relationship");

            let value = match data {
                None => Value::Null,
                Some(Linkage::One(identifier)) => self.linked(identifier, configured, index)?,
                Some(Linkage::Many(identifiers)) => Value::Array(
                    identifiers
                        .iter()
                        .map(|identifier| self.linked(identifier, configured, index))
                        .collect::<Result<Vec<_>>>()?,
                ),
            };
            record.insert(field, value);
        }

        if let Some(links) = &resource.links {
            record.insert("links".to_string(), links.clone());
        }
        if let Some(meta) = &resource.meta {
            record.insert("meta".to_string(), meta.clone());
        }

        if let Some(case) = config.unconvert_case {
            record = case.convert_map(&record);
        }

        if !config.whitelist_on_deserialize.is_empty() {
            record.retain(|key, _| config.whitelist_on_deserialize.contains(key.as_str()));
        }
        record.retain(|key, _| !config.blacklist_on_deserialize.contains(key.as_str()));

        Ok(Value::Object(record))
    }

    /// The included record for `identifier` when present, else its bare id
    fn linked(
        &self,
        identifier: &ResourceIdentifier,
        configured: Option<(&String, &RelationshipConfig)>,
        index: Option<&IncludedIndex<'a>>,
    ) -> Result<Value> {
        let Some(included) = index.and_then(|index| index.get(identifier)) else {
            return Ok(Value::String(identifier.id.clone()));
        };

        let config = match configured {
            Some((key, rel)) => self.registry.lookup_relationship(key, rel)?,
            None => match self.registry.lookup(&identifier.type_name, DEFAULT_VARIANT) {
                Ok(config) => config,
                Err(_) => return Ok(Value::String(identifier.id.clone())),
            },
        };
        self.deserialize_resource(&config, included, None)
    }
}

fn index_included(document: &Document) -> IncludedIndex<'_> {
    document
        .included
        .iter()
        .flatten()
        .filter_map(|resource| {
            resource
                .identifier()
                .map(|identifier| (identifier, resource))
        })
        .collect()
}

/// Exact key first, then a match modulo the input naming convention
fn relationship_config<'c>(
    config: &'c ResourceConfig,
    key: &str,
) -> Option<(&'c String, &'c RelationshipConfig)> {
    if let Some(found) = config.relationships.get_key_value(key) {
        return Some(found);
    }
    let case = config.unconvert_case?;
    let wanted = case.convert_key(key);
    config
        .relationships
        .iter()
        .find(|(name, _)| case.convert_key(name) == wanted)
}

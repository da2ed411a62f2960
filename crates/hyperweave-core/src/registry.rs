//! Schema registry
//!
//! Maps `(type, variant)` to a normalized [`ResourceConfig`]. A registry is an
//! ordinary value: build one, register during setup, then share it by
//! reference (or `Arc`) with every serialize/deserialize call. Reads take a
//! shared lock; concurrent writes to the same key are last-writer-wins.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::options::{DEFAULT_VARIANT, RelationshipConfig, ResourceConfig, normalize};

/// Registered resource configurations
#[derive(Debug, Default)]
pub struct Registry {
    schemas: RwLock<HashMap<String, HashMap<String, Arc<ResourceConfig>>>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every resource declared in a schema file
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = Self::new();
        for resource in &config.resources {
            let variant = resource.variant.as_deref().unwrap_or(DEFAULT_VARIANT);
            registry.register_variant(&resource.type_name, variant, &resource.options)?;
        }
        Ok(registry)
    }

    /// Register raw options for `type_name` under the default variant
    pub fn register(&self, type_name: &str, raw: &Value) -> Result<()> {
        self.register_variant(type_name, DEFAULT_VARIANT, raw)
    }

    /// Register raw options for `type_name` under `variant`.
    ///
    /// Options are normalized first; on failure nothing is stored.
    /// Re-registering a key replaces the prior entry.
    pub fn register_variant(&self, type_name: &str, variant: &str, raw: &Value) -> Result<()> {
        let config = normalize(raw)?;
        self.register_config(type_name, variant, config);
        Ok(())
    }

    /// Store an already-built configuration
    pub fn register_config(
        &self,
        type_name: impl Into<String>,
        variant: impl Into<String>,
        config: ResourceConfig,
    ) {
        let type_name = type_name.into();
        let variant = variant.into();
        tracing::debug!(type_name = %type_name, variant = %variant, "registering resource");

        let replaced = self
            .schemas
            .write()
            .entry(type_name.clone())
            .or_default()
            .insert(variant.clone(), Arc::new(config));
        if replaced.is_some() {
            tracing::debug!(type_name = %type_name, variant = %variant, "replaced existing registration");
        }
    }

    /// Look up a configuration, distinguishing unknown types from unknown variants
    pub fn lookup(&self, type_name: &str, variant: &str) -> Result<Arc<ResourceConfig>> {
        let schemas = self.schemas.read();
        let variants = schemas.get(type_name).ok_or_else(|| Error::UnknownType {
            type_name: type_name.to_string(),
        })?;
        variants
            .get(variant)
            .cloned()
            .ok_or_else(|| Error::UnknownVariant {
                type_name: type_name.to_string(),
                variant: variant.to_string(),
            })
    }

    /// Look up the target of a relationship
    pub(crate) fn lookup_relationship(
        &self,
        relationship: &str,
        rel: &RelationshipConfig,
    ) -> Result<Arc<ResourceConfig>> {
        self.lookup(&rel.type_name, &rel.schema)
            .map_err(|err| match err {
                Error::UnknownType { type_name } => Error::UnregisteredRelationshipType {
                    relationship: relationship.to_string(),
                    type_name,
                },
                Error::UnknownVariant { type_name, variant } => {
                    Error::UnregisteredRelationshipVariant {
                        relationship: relationship.to_string(),
                        type_name,
                        variant,
                    }
                }
                other => other,
            })
    }

    /// Look up a dynamically resolved type
    pub(crate) fn lookup_dynamic(&self, type_name: &str, variant: &str) -> Result<Arc<ResourceConfig>> {
        self.lookup(type_name, variant).map_err(|err| match err {
            Error::UnknownType { type_name } => Error::UnregisteredType { type_name },
            other => other,
        })
    }

    /// Whether any variant of `type_name` is registered
    pub fn contains_type(&self, type_name: &str) -> bool {
        self.schemas.read().contains_key(type_name)
    }

    /// All registered `(type, variant)` pairs, sorted
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .schemas
            .read()
            .iter()
            .flat_map(|(type_name, variants)| {
                variants
                    .keys()
                    .map(move |variant| (type_name.clone(), variant.clone()))
            })
            .collect();
        entries.sort();
        entries
    }
}

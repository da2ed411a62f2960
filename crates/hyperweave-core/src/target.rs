//! Call targets and per-call options
//!
//! A call names either a fixed resource type or a [`DynamicType`] descriptor
//! that resolves each record's type from its own content.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::options::DEFAULT_VARIANT;
use crate::resolver::ValueSource;

/// Closure mapping a raw record (or resource object) to its type
pub type TypeResolverFn = dyn Fn(&Value) -> Option<String> + Send + Sync;

/// How a dynamic descriptor finds a record's type
#[derive(Clone)]
pub enum TypeSource {
    /// Read this field of the record
    Field(String),
    /// Call this closure with the record
    Resolver(Arc<TypeResolverFn>),
}

impl fmt::Debug for TypeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field) => f.debug_tuple("Field").field(field).finish(),
            Self::Resolver(_) => f.write_str("Resolver(<fn>)"),
        }
    }
}

/// Descriptor for heterogeneous collections
#[derive(Debug, Clone)]
pub struct DynamicType {
    /// Where each record's type comes from
    pub type_source: TypeSource,
    /// Document links; no single resource configuration applies
    pub top_level_links: ValueSource,
    /// Document meta; no single resource configuration applies
    pub top_level_meta: ValueSource,
}

impl DynamicType {
    /// Resolve types from `field` of each record
    pub fn field(field: impl Into<String>) -> Self {
        Self::new(TypeSource::Field(field.into()))
    }

    /// Resolve types with a closure
    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(TypeSource::Resolver(Arc::new(f)))
    }

    fn new(type_source: TypeSource) -> Self {
        Self {
            type_source,
            top_level_links: ValueSource::empty(),
            top_level_meta: ValueSource::empty(),
        }
    }

    /// Set the document links source
    pub fn with_top_level_links(mut self, links: ValueSource) -> Self {
        self.top_level_links = links;
        self
    }

    /// Set the document meta source
    pub fn with_top_level_meta(mut self, meta: ValueSource) -> Self {
        self.top_level_meta = meta;
        self
    }

    /// Resolve the concrete type of `record`.
    ///
    /// Fails with [`Error::UnresolvableType`] when no non-empty type string
    /// comes out.
    pub fn resolve_type(&self, record: &Value) -> Result<String> {
        let resolved = match &self.type_source {
            TypeSource::Field(field) => record
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_string),
            TypeSource::Resolver(f) => f(record),
        };
        resolved
            .filter(|type_name| !type_name.is_empty())
            .ok_or(Error::UnresolvableType)
    }
}

/// Fixed type or dynamic descriptor
#[derive(Debug, Clone)]
pub enum ResourceTarget {
    /// Every record has this type
    Type(String),
    /// Each record's type is resolved from its content
    Dynamic(DynamicType),
}

impl From<&str> for ResourceTarget {
    fn from(type_name: &str) -> Self {
        Self::Type(type_name.to_string())
    }
}

impl From<String> for ResourceTarget {
    fn from(type_name: String) -> Self {
        Self::Type(type_name)
    }
}

impl From<DynamicType> for ResourceTarget {
    fn from(descriptor: DynamicType) -> Self {
        Self::Dynamic(descriptor)
    }
}

/// Variant name and extra context for one call.
///
/// Converts from a string (a variant name) or from a JSON value, so either
/// may be passed directly. A JSON string is read as a variant name; any other
/// JSON value becomes extra context with the default variant.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOptions {
    /// Variant of the resource configuration to use
    pub variant: String,
    /// Extra context passed to context-aware value sources
    pub extra: Value,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            variant: DEFAULT_VARIANT.to_string(),
            extra: Value::Object(Default::default()),
        }
    }
}

impl CallOptions {
    /// Use the named variant
    pub fn variant(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            ..Self::default()
        }
    }

    /// Attach extra context
    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = extra;
        self
    }
}

impl From<&str> for CallOptions {
    fn from(variant: &str) -> Self {
        Self::variant(variant)
    }
}

impl From<String> for CallOptions {
    fn from(variant: String) -> Self {
        Self::variant(variant)
    }
}

impl From<Option<&str>> for CallOptions {
    fn from(variant: Option<&str>) -> Self {
        variant.map(Self::variant).unwrap_or_default()
    }
}

impl From<Value> for CallOptions {
    fn from(value: Value) -> Self {
        match value {
            Value::String(variant) => Self::variant(variant),
            extra => Self::default().with_extra(extra),
        }
    }
}

impl From<()> for CallOptions {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_type_from_field() {
        let descriptor = DynamicType::field("type");
        assert_eq!(
            descriptor.resolve_type(&json!({"type": "article"})).unwrap(),
            "article"
        );
    }

    #[test]
    fn test_resolve_type_with_closure() {
        let descriptor = DynamicType::resolver(|record| {
            record
                .get("kind")
                .and_then(Value::as_str)
                .map(|kind| format!("{}s", kind))
        });
        assert_eq!(
            descriptor.resolve_type(&json!({"kind": "photo"})).unwrap(),
            "photos"
        );
    }

    #[test]
    fn test_unresolvable_type() {
        let descriptor = DynamicType::field("type");
        assert!(matches!(
            descriptor.resolve_type(&json!({"id": 1})),
            Err(Error::UnresolvableType)
        ));
        assert!(matches!(
            descriptor.resolve_type(&json!({"type": ""})),
            Err(Error::UnresolvableType)
        ));
    }

    #[test]
    fn test_call_options_conversions() {
        assert_eq!(CallOptions::from("only-body").variant, "only-body");

        let extra = CallOptions::from(json!({"count": 2}));
        assert_eq!(extra.variant, DEFAULT_VARIANT);
        assert_eq!(extra.extra["count"], 2);

        assert_eq!(CallOptions::from(None), CallOptions::default());
        assert_eq!(CallOptions::from(()), CallOptions::default());
    }

    #[test]
    fn test_json_string_is_a_variant_name() {
        let options = CallOptions::from(json!("slim"));
        assert_eq!(options.variant, "slim");
        assert_eq!(options.extra, json!({}));

        let options = CallOptions::from(json!([1, 2]));
        assert_eq!(options.variant, DEFAULT_VARIANT);
        assert_eq!(options.extra, json!([1, 2]));
    }
}

//! Value sources for links and meta
//!
//! Resource links, relationship links and top-level links/meta are all
//! configured as a [`ValueSource`]: a literal, a closure over the record, a
//! closure over the record and the caller's extra context, or a mapping whose
//! entries are themselves value sources.
//!
//! # Example
//!
//! ```rust
//! use hyperweave_core::resolver::ValueSource;
//! use serde_json::json;
//!
//! let links = ValueSource::mapping([
//!     ("self", ValueSource::computed(|record| {
//!         record.get("id").map(|id| json!(format!("/articles/{}", id)))
//!     })),
//!     ("docs", ValueSource::from(json!("/docs/articles"))),
//! ]);
//!
//! let resolved = links.resolve(&json!({"id": 1}), &json!({})).unwrap();
//! assert_eq!(resolved, json!({"self": "/articles/1", "docs": "/docs/articles"}));
//! ```

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Closure over a record
pub type ComputeFn = dyn Fn(&Value) -> Option<Value> + Send + Sync;

/// Closure over a record and the caller's extra context
pub type ComputeWithContextFn = dyn Fn(&Value, &Value) -> Option<Value> + Send + Sync;

/// A configuration value resolved against a record at serialization time
#[derive(Clone)]
pub enum ValueSource {
    /// Returned as-is
    Literal(Value),
    /// Called with the record
    Computed(Arc<ComputeFn>),
    /// Called with the record and the extra context
    ComputedWithContext(Arc<ComputeWithContextFn>),
    /// Every entry is resolved; entries resolving to nothing are dropped
    Mapping(IndexMap<String, ValueSource>),
}

impl ValueSource {
    /// Build a source from a closure over the record
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Build a source from a closure over the record and the extra context
    pub fn with_context<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Option<Value> + Send + Sync + 'static,
    {
        Self::ComputedWithContext(Arc::new(f))
    }

    /// Build a mapping source
    pub fn mapping<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ValueSource)>,
        K: Into<String>,
    {
        Self::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// An empty mapping; always resolves to nothing
    pub fn empty() -> Self {
        Self::Mapping(IndexMap::new())
    }

    /// Whether this source can never produce a value
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Mapping(entries) => entries.is_empty(),
            Self::Literal(value) => is_absent(value),
            _ => false,
        }
    }

    /// Insert or replace an entry, turning a non-mapping source into a mapping
    pub fn insert(&mut self, key: impl Into<String>, source: ValueSource) {
        match self {
            Self::Mapping(entries) => {
                entries.insert(key.into(), source);
            }
            _ => *self = Self::mapping([(key.into(), source)]),
        }
    }

    /// Resolve against `record` and `context`.
    ///
    /// Returns `None` when the final value is null or an empty object, so that
    /// callers can omit the corresponding document key.
    pub fn resolve(&self, record: &Value, context: &Value) -> Option<Value> {
        self.resolve_inner(record, context)
            .filter(|value| !is_absent(value))
    }

    fn resolve_inner(&self, record: &Value, context: &Value) -> Option<Value> {
        match self {
            Self::Literal(value) => Some(value.clone()),
            Self::Computed(f) => f(record),
            Self::ComputedWithContext(f) => f(record, context),
            Self::Mapping(entries) => {
                let resolved: Map<String, Value> = entries
                    .iter()
                    .filter_map(|(key, source)| {
                        source
                            .resolve_inner(record, context)
                            .map(|value| (key.clone(), value))
                    })
                    .collect();
                Some(Value::Object(resolved))
            }
        }
    }
}

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl Default for ValueSource {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for ValueSource {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
            Self::ComputedWithContext(_) => f.write_str("ComputedWithContext(<fn>)"),
            Self::Mapping(entries) => f.debug_tuple("Mapping").field(entries).finish(),
        }
    }
}

/// Closures compare by identity.
impl PartialEq for ValueSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Computed(a), Self::Computed(b)) => Arc::ptr_eq(a, b),
            (Self::ComputedWithContext(a), Self::ComputedWithContext(b)) => Arc::ptr_eq(a, b),
            (Self::Mapping(a), Self::Mapping(b)) => a == b,
            _ => false,
        }
    }
}

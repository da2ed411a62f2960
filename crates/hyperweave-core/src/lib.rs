//! Hyperweave Core Library
//!
//! This crate provides the schema-driven transform engine for Hyperweave:
//! - Resource option normalization and validation
//! - A schema registry keyed by resource type and variant
//! - Serialization of domain records into JSON:API documents
//! - Deserialization of JSON:API documents back into records
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Options   │────▶│  Registry   │────▶│  Serialize  │──▶ Document
//! │ (JSON/YAML) │     │ type+variant│     │ Deserialize │──▶ Records
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use hyperweave_core::{Deserializer, Registry, Serializer};
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! registry.register("article", &json!({
//!     "relationships": { "author": { "type": "people" } }
//! }))?;
//! registry.register("people", &json!({}))?;
//!
//! let doc = Serializer::new(&registry).serialize(
//!     "article",
//!     &json!({"id": 1, "title": "Hi", "author": {"id": 9, "name": "Dan"}}),
//!     (),
//! )?;
//! assert_eq!(doc.included.as_ref().map(Vec::len), Some(1));
//!
//! let record = Deserializer::new(&registry).deserialize("article", &doc, None)?;
//! assert_eq!(record["author"]["name"], "Dan");
//! # Ok::<(), hyperweave_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod case;
pub mod config;
pub mod deserializer;
pub mod document;
pub mod error;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod serializer;
pub mod target;

pub use case::KeyCase;
pub use config::Config;
pub use deserializer::{DeserializeCall, Deserializer};
pub use document::{Document, PrimaryData, ResourceObject};
pub use error::{Error, Result};
pub use options::{DEFAULT_VARIANT, RelationshipConfig, ResourceConfig};
pub use registry::Registry;
pub use resolver::ValueSource;
pub use serializer::{DataShape, SerializeCall, Serializer};
pub use target::{CallOptions, DynamicType, ResourceTarget};

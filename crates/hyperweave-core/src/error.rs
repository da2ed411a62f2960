//! Error types for hyperweave-core

use thiserror::Error;

/// Result type alias for hyperweave-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hyperweave-core
#[derive(Error, Debug)]
pub enum Error {
    /// Raw resource options do not have the expected shape
    #[error("invalid configuration at '{path}': {message}")]
    Configuration {
        /// Dotted path of the offending option (e.g. `relationships.author.type`)
        path: String,
        /// Description of what's invalid
        message: String,
    },

    /// The requested top-level type was never registered
    #[error("no type registered for '{type_name}'")]
    UnknownType {
        /// Requested resource type
        type_name: String,
    },

    /// The type is registered, but not under the requested variant
    #[error("no schema '{variant}' registered for '{type_name}'")]
    UnknownVariant {
        /// Requested resource type
        type_name: String,
        /// Requested variant name
        variant: String,
    },

    /// A populated relationship targets a type that was never registered
    #[error("relationship '{relationship}' targets unregistered type '{type_name}'")]
    UnregisteredRelationshipType {
        /// Relationship key on the parent resource
        relationship: String,
        /// Target resource type
        type_name: String,
    },

    /// A populated relationship targets a variant that was never registered
    #[error(
        "relationship '{relationship}' targets unregistered schema '{variant}' of type '{type_name}'"
    )]
    UnregisteredRelationshipVariant {
        /// Relationship key on the parent resource
        relationship: String,
        /// Target resource type
        type_name: String,
        /// Target variant name
        variant: String,
    },

    /// Dynamic type resolution produced no type
    #[error("unable to resolve a resource type for record")]
    UnresolvableType,

    /// Dynamic type resolution produced a type with no configuration
    #[error("no type registered for dynamically resolved type '{type_name}'")]
    UnregisteredType {
        /// Resolved resource type
        type_name: String,
    },

    /// Schema file could not be found
    #[error("schema file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse the YAML schema file
    #[error("failed to parse schema file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn configuration(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            path: path.into(),
            message: message.into(),
        }
    }
}

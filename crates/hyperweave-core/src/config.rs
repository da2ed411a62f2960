//! Schema file parsing
//!
//! Resource registrations can be declared in a `hyperweave.yaml` file and
//! loaded into a [`Registry`](crate::Registry) with
//! [`Registry::from_config`](crate::Registry::from_config).
//!
//! # Example
//!
//! ```yaml
//! name: blog
//! resources:
//!   - type: article
//!     options:
//!       blacklist: [updated]
//!       relationships:
//!         author: { type: people }
//!   - type: comment
//!     variant: only-body
//!     options: { id: _id, whitelist: [body] }
//! ```
//!
//! Option shapes are validated at registration time, not at parse time, so a
//! malformed option is reported with its exact path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name searched for when a directory is given
pub const SCHEMA_FILE_NAME: &str = "hyperweave.yaml";

/// Root of a schema file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Schema set name
    #[serde(default = "default_name")]
    pub name: String,

    /// Resource registrations, applied in order
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
}

fn default_name() -> String {
    "hyperweave".to_string()
}

/// One registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Resource type
    #[serde(rename = "type")]
    pub type_name: String,

    /// Variant name; the default variant when omitted
    #[serde(default)]
    pub variant: Option<String>,

    /// Raw resource options
    #[serde(default)]
    pub options: serde_json::Value,
}

/// A loaded schema file
#[derive(Debug, Clone)]
pub struct Config {
    /// Schema set name
    pub name: String,

    /// Resource registrations
    pub resources: Vec<ResourceEntry>,

    /// Path the schema was loaded from
    pub path: PathBuf,
}

impl Config {
    /// Load a schema file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a schema file, or a directory containing `hyperweave.yaml`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_path = if path.is_dir() {
            path.join(SCHEMA_FILE_NAME)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            return Err(Error::ConfigNotFound {
                path: config_path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let schema = Self::parse(&contents)?;
        tracing::debug!(
            path = %config_path.display(),
            resources = schema.resources.len(),
            "loaded schema file"
        );

        Ok(Self {
            name: schema.name,
            resources: schema.resources,
            path: config_path,
        })
    }

    /// Parse schema file contents
    pub fn parse(contents: &str) -> Result<SchemaFile> {
        Ok(serde_yaml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_minimal_schema() {
        let schema = Config::parse("name: blog\n").unwrap();
        assert_eq!(schema.name, "blog");
        assert!(schema.resources.is_empty());
    }

    #[test]
    fn test_parse_resources() {
        let yaml = r#"
resources:
  - type: article
    options:
      blacklist: [updated]
      relationships:
        author:
          type: people
  - type: comment
    variant: only-body
    options:
      id: _id
  - type: people
"#;
        let schema = Config::parse(yaml).unwrap();
        assert_eq!(schema.name, "hyperweave");
        assert_eq!(schema.resources.len(), 3);
        assert_eq!(schema.resources[0].type_name, "article");
        assert_eq!(
            schema.resources[0].options["relationships"]["author"]["type"],
            "people"
        );
        assert_eq!(schema.resources[1].variant.as_deref(), Some("only-body"));
        assert_eq!(schema.resources[1].options, json!({"id": "_id"}));
        assert!(schema.resources[2].options.is_null());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SCHEMA_FILE_NAME),
            "name: test\nresources:\n  - type: tag\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.name, "test");
        assert_eq!(config.resources.len(), 1);
        assert!(config.path.ends_with(SCHEMA_FILE_NAME));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("missing.yaml"));
        assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
    }

    #[test]
    fn test_load_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "resources: [type: \n  - : :").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::ConfigParse(_))));
    }
}

//! CLI command implementations

pub mod deserialize;
pub mod serialize;
pub mod validate;

use anyhow::{Context, Result, bail};
use hyperweave_core::{Config, DynamicType, Registry, ResourceTarget};
use std::io::Read;
use std::sync::Arc;

use crate::TargetArgs;

/// Load the schema file and register every resource it declares
pub fn load_registry(config_path: &str) -> Result<Arc<Registry>> {
    let config = Config::load(config_path).context("Failed to load schema file")?;
    let registry = Registry::from_config(&config)
        .with_context(|| format!("Invalid schema file {}", config.path.display()))?;
    Ok(Arc::new(registry))
}

/// Read and parse a JSON input file, or stdin for "-"
pub fn read_json(input: &str) -> Result<serde_json::Value> {
    let contents = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))?
    };
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", input))
}

impl TargetArgs {
    /// The resource target selected on the command line
    pub fn resource_target(&self) -> Result<ResourceTarget> {
        match (&self.type_name, &self.type_field) {
            (Some(type_name), None) => Ok(ResourceTarget::from(type_name.as_str())),
            (None, Some(field)) => Ok(DynamicType::field(field.as_str()).into()),
            _ => bail!("Exactly one of --type or --type-field is required"),
        }
    }
}

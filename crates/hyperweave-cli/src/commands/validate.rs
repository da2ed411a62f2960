//! Validate schema file command

use anyhow::Result;

use super::load_registry;

/// Run the validate command
pub async fn run(config_path: &str) -> Result<()> {
    tracing::info!("Validating schema file: {}", config_path);

    let registry = load_registry(config_path)?;
    let entries = registry.entries();
    for (type_name, variant) in &entries {
        println!("{}/{}", type_name, variant);
    }

    tracing::info!("✓ {} resource schema(s) registered", entries.len());
    Ok(())
}

//! Deserialize command

use anyhow::{Context, Result};
use hyperweave_core::Document;
use hyperweave_runtime::AsyncTransformer;

use super::{load_registry, read_json};
use crate::TargetArgs;

/// Run the deserialize command
pub async fn run(
    config_path: &str,
    input: &str,
    target: &TargetArgs,
    variant: Option<&str>,
) -> Result<()> {
    let registry = load_registry(config_path)?;
    let document =
        Document::try_from(read_json(input)?).context("Input is not a JSON:API document")?;

    let records = AsyncTransformer::new(registry)
        .deserialize(target.resource_target()?, &document, variant)
        .await
        .context("Deserialization failed")?;

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

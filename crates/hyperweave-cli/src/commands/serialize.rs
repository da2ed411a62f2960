//! Serialize command

use anyhow::{Context, Result};
use hyperweave_core::{CallOptions, DEFAULT_VARIANT};
use hyperweave_runtime::AsyncTransformer;

use super::{load_registry, read_json};
use crate::TargetArgs;

/// Run the serialize command
pub async fn run(
    config_path: &str,
    input: &str,
    target: &TargetArgs,
    variant: Option<&str>,
    extra: Option<&str>,
) -> Result<()> {
    let registry = load_registry(config_path)?;
    let data = read_json(input)?;

    let mut options = CallOptions::variant(variant.unwrap_or(DEFAULT_VARIANT));
    if let Some(extra) = extra {
        let extra = serde_json::from_str(extra).context("Invalid --extra JSON")?;
        options = options.with_extra(extra);
    }

    let document = AsyncTransformer::new(registry)
        .serialize(target.resource_target()?, &data, options)
        .await
        .context("Serialization failed")?;

    tracing::debug!(
        resources = document.data.resources().len(),
        included = document.included.as_ref().map_or(0, Vec::len),
        "serialized document"
    );
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

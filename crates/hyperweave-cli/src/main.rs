//! Hyperweave CLI
//!
//! Serializes records into JSON:API documents (and back) using the resource
//! schemas declared in a `hyperweave.yaml` file.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Hyperweave - schema-driven JSON:API transforms
#[derive(Parser)]
#[command(name = "hyperweave")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema file path, or a directory containing hyperweave.yaml
    #[arg(short, long, default_value = "hyperweave.yaml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize JSON records into a JSON:API document
    Serialize {
        /// Input JSON file ("-" reads stdin)
        input: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Schema variant
        #[arg(long)]
        variant: Option<String>,

        /// Extra context passed to top-level links and meta, as JSON
        #[arg(long)]
        extra: Option<String>,
    },

    /// Deserialize a JSON:API document into records
    Deserialize {
        /// Input document file ("-" reads stdin)
        input: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Schema variant
        #[arg(long)]
        variant: Option<String>,
    },

    /// Validate the schema file and list registered resources
    Validate,
}

/// Resource type selection
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Resource type every record belongs to
    #[arg(short = 't', long = "type")]
    pub type_name: Option<String>,

    /// Record field holding each record's type
    #[arg(long)]
    pub type_field: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the transformed JSON
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Serialize {
            input,
            target,
            variant,
            extra,
        } => {
            commands::serialize::run(
                &cli.config,
                &input,
                &target,
                variant.as_deref(),
                extra.as_deref(),
            )
            .await?;
        }
        Commands::Deserialize {
            input,
            target,
            variant,
        } => {
            commands::deserialize::run(&cli.config, &input, &target, variant.as_deref()).await?;
        }
        Commands::Validate => {
            commands::validate::run(&cli.config).await?;
        }
    }

    Ok(())
}

pub mod aggregate;
pub mod completion;
pub mod config;
pub mod error;
pub mod ingest;
pub mod package;
pub mod pipeline;
pub mod shell;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use shell::ShellOutcome;

#[derive(Parser)]
#[clap(
    name = "api-alchemist",
    version,
    about = "Turn a zip of Python scripts into a ready-to-run Flask service via an LLM completion endpoint"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transform an uploaded archive into a Flask service application
    Transform(TransformArgs),
}

#[derive(Args)]
pub struct TransformArgs {
    /// Zip archive of Python scripts to transform
    pub archive: Option<PathBuf>,

    /// API key for the completion endpoint; falls back to OPENAI_API_KEY or
    /// a masked prompt
    #[clap(long)]
    pub api_key: Option<String>,

    /// Where to write the transformed archive
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Path to a YAML config file
    #[clap(long)]
    pub config: Option<PathBuf>,
}

/// Async CLI entrypoint, extracted so integration tests can drive it.
pub async fn run(cli: Cli) -> Result<ShellOutcome> {
    match cli.command {
        Commands::Transform(args) => {
            let config = config::load(args.config.as_deref())?;
            shell::run_form(&args, &config).await
        }
    }
}

//! The interactive form: credential entry, archive selection, a spinner
//! while the pipeline runs, and styled status messages.
//!
//! Processing begins only once both inputs are present. A missing archive
//! warns without any network call; a missing credential warns without any
//! extraction.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::completion::HttpCompletionClient;
use crate::config::TransformConfig;
use crate::error::AlchemistError;
use crate::pipeline::run_transform;
use crate::TransformArgs;

/// How one invocation of the form ended.
#[derive(Debug)]
pub enum ShellOutcome {
    /// Pipeline ran; the output archive was written to this path.
    Completed(PathBuf),
    /// No archive was supplied; warned and stopped before any network call.
    MissingArchive,
    /// No credential was supplied; warned and stopped before any extraction.
    MissingCredential,
}

pub async fn run_form(args: &TransformArgs, config: &TransformConfig) -> Result<ShellOutcome> {
    let Some(archive_path) = args.archive.as_ref() else {
        eprintln!(
            "{}",
            style("Please provide a zip archive of Python scripts to transform.").yellow()
        );
        return Ok(ShellOutcome::MissingArchive);
    };

    let Some(api_key) = resolve_credential(args) else {
        eprintln!("{}", style("Please enter your OpenAI API key.").yellow());
        return Ok(ShellOutcome::MissingCredential);
    };

    info!(archive = %archive_path.display(), "Processing uploaded archive");
    let archive_bytes = fs::read(archive_path).map_err(|e| AlchemistError::InvalidArchive {
        reason: format!("cannot read {}: {e}", archive_path.display()),
    })?;

    let client = HttpCompletionClient::new(&config.completion, api_key)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("Transforming and updating your application...");

    let result = run_transform(&client, config, &archive_bytes).await;
    spinner.finish_and_clear();

    let report = result?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.archive_path.clone());
    fs::write(&output_path, &report.archive).map_err(|e| AlchemistError::OutputWriteFailed {
        path: output_path.display().to_string(),
        reason: e.to_string(),
    })?;

    println!(
        "{} {} {}",
        style("Transformation complete.").green(),
        "Your updated archive is ready at",
        style(output_path.display()).bold()
    );

    Ok(ShellOutcome::Completed(output_path))
}

/// Credential lookup order: flag, environment, masked prompt. The prompt is
/// only offered on an attended terminal.
fn resolve_credential(args: &TransformArgs) -> Option<String> {
    if let Some(key) = &args.api_key {
        return Some(key.clone());
    }
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        if !key.is_empty() {
            return Some(key);
        }
    }
    if console::user_attended() {
        if let Ok(key) = inquire::Password::new("Enter your OpenAI API key:")
            .without_confirmation()
            .prompt()
        {
            if !key.is_empty() {
                return Some(key);
            }
        }
    }
    None
}

//! The transformation pipeline: extract, aggregate, two sequential
//! completion stages, package.
//!
//! Stage 2 never starts before stage 1 completes, and failure of any step
//! aborts the run. Both scratch directories are removed whatever the
//! outcome.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::aggregate::aggregate_sources;
use crate::completion::CompletionClient;
use crate::config::TransformConfig;
use crate::error::Result;
use crate::ingest::extract_archive;
use crate::package::package_artifact;

/// Stage 1 instruction: turn the concatenated scripts into a service app.
pub const CONVERT_INSTRUCTION: &str = "\
You are given the combined code from multiple Python files of an existing \
application. Transform this code into a complete, functional Flask API \
application. The result must include: a Flask app instance in `app.py`, all \
necessary imports for Flask and any other required libraries, Flask routes \
corresponding to the functionality in the combined code, and error handling \
and configuration so the application runs correctly. Provide the complete \
code including the Flask app setup and routes.";

/// Stage 2 instruction: review stage 1's output and fix framework issues.
pub const REVIEW_INSTRUCTION: &str = "\
You are an expert Python developer with extensive experience in Flask. The \
following code is a Flask API application generated from multiple Python \
files. Review the code carefully and fix any issues related to Flask so that \
the application works correctly and is free of errors. Provide the corrected \
and complete Flask application code.";

/// Rough context ceiling; the aggregate is sent regardless, but crossing it
/// is worth a warning because the reply degrades silently past the model's
/// window.
const CONTEXT_TOKEN_BUDGET: usize = 100_000;

/// What one completed run produced. Scratch paths are recorded after their
/// directories have been removed, for logging and verification.
pub struct RunReport {
    pub run_id: Uuid,
    pub source_files: usize,
    pub archive: Vec<u8>,
    pub extract_scratch: std::path::PathBuf,
    pub package_scratch: std::path::PathBuf,
}

/// Runs the whole pipeline over one uploaded archive.
pub async fn run_transform(
    client: &dyn CompletionClient,
    config: &TransformConfig,
    archive_bytes: &[u8],
) -> Result<RunReport> {
    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, upload_bytes = archive_bytes.len(), "Transformation run starting");

    let extracted = extract_archive(archive_bytes)?;
    let extract_scratch = extracted.scratch_path();
    let source_files = extracted.files().len();

    let aggregated = aggregate_sources(extracted.root(), extracted.files())?;

    let estimated_tokens = aggregated.len() / 4;
    if estimated_tokens > CONTEXT_TOKEN_BUDGET {
        warn!(
            run_id = %run_id,
            estimated_tokens,
            budget = CONTEXT_TOKEN_BUDGET,
            "Aggregated source likely exceeds the model context window; sending unchanged"
        );
    }

    info!(run_id = %run_id, stage = 1, "Invoking completion: convert to service application");
    let converted = client.complete(CONVERT_INSTRUCTION, &aggregated).await?;
    info!(run_id = %run_id, stage = 1, reply_bytes = converted.len(), "Stage 1 complete");

    info!(run_id = %run_id, stage = 2, "Invoking completion: review and fix");
    let reviewed = client.complete(REVIEW_INSTRUCTION, &converted).await?;
    info!(run_id = %run_id, stage = 2, reply_bytes = reviewed.len(), "Stage 2 complete");

    let packaged = package_artifact(&reviewed, config.output.include_usage_example)?;

    // Extraction scratch is dropped here even on the early-return paths
    // above; closing explicitly only surfaces removal problems.
    if let Err(e) = extracted.close() {
        error!(run_id = %run_id, error = %e, "Failed to remove extraction scratch");
    }

    info!(
        run_id = %run_id,
        source_files,
        output_bytes = packaged.bytes.len(),
        "Transformation run complete"
    );

    Ok(RunReport {
        run_id,
        source_files,
        archive: packaged.bytes,
        extract_scratch,
        package_scratch: packaged.scratch_path,
    })
}

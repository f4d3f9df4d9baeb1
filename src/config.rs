//! Runtime configuration: completion endpoint settings and output packaging
//! options.
//!
//! A static YAML file (no secrets) may override any field; `ALCHEMIST_ENDPOINT`
//! and `ALCHEMIST_MODEL` environment variables take precedence over both. The
//! API credential is deliberately not part of this config; it is supplied at
//! runtime only and never persisted.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_OUTPUT_ARCHIVE: &str = "transformed_app.zip";

#[derive(Debug, Clone)]
pub struct TransformConfig {
    pub completion: CompletionConfig,
    pub output: OutputConfig,
}

/// Settings for the outbound chat-completion call.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Settings for the packaged result.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub archive_path: PathBuf,
    pub include_usage_example: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            completion: CompletionConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                model: DEFAULT_MODEL.to_string(),
                max_tokens: DEFAULT_MAX_TOKENS,
            },
            output: OutputConfig {
                archive_path: PathBuf::from(DEFAULT_OUTPUT_ARCHIVE),
                include_usage_example: true,
            },
        }
    }
}

/// On-disk shape of the optional YAML config. Every field is optional so a
/// partial file only overrides what it names.
#[derive(Deserialize, Default)]
struct StaticConfig {
    #[serde(default)]
    completion: StaticCompletion,
    #[serde(default)]
    output: StaticOutput,
}

#[derive(Deserialize, Default)]
struct StaticCompletion {
    endpoint: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
}

#[derive(Deserialize, Default)]
struct StaticOutput {
    archive_path: Option<PathBuf>,
    include_usage_example: Option<bool>,
}

/// Loads the merged configuration: defaults, then the YAML file (if given),
/// then environment overrides.
pub fn load(path: Option<&Path>) -> Result<TransformConfig> {
    let mut config = TransformConfig::default();

    if let Some(path) = path {
        info!(config_path = ?path, "Loading configuration from file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let static_conf: StaticConfig =
            serde_yaml::from_str(&content).context("Failed to parse config YAML")?;

        if let Some(endpoint) = static_conf.completion.endpoint {
            config.completion.endpoint = endpoint;
        }
        if let Some(model) = static_conf.completion.model {
            config.completion.model = model;
        }
        if let Some(max_tokens) = static_conf.completion.max_tokens {
            config.completion.max_tokens = max_tokens;
        }
        if let Some(archive_path) = static_conf.output.archive_path {
            config.output.archive_path = archive_path;
        }
        if let Some(include) = static_conf.output.include_usage_example {
            config.output.include_usage_example = include;
        }
    }

    if let Ok(endpoint) = std::env::var("ALCHEMIST_ENDPOINT") {
        config.completion.endpoint = endpoint;
    }
    if let Ok(model) = std::env::var("ALCHEMIST_MODEL") {
        config.completion.model = model;
    }

    info!(
        endpoint = %config.completion.endpoint,
        model = %config.completion.model,
        max_tokens = config.completion.max_tokens,
        output = %config.output.archive_path.display(),
        "Config loaded and merged"
    );

    Ok(config)
}

//! Application configuration for kbagent.
//!
//! User config lives at `~/.kbagent/kbagent.toml`.
//! Environment variables override config file values, which override
//! defaults. CLI flags are applied last by the binaries.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KbAgentError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "kbagent.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".kbagent";

/// Environment variables recognised by [`AppConfig::apply_env`].
pub mod env_vars {
    pub const AWS_REGION: &str = "AWS_REGION";
    pub const KNOWLEDGE_BASE_ID: &str = "KNOWLEDGE_BASE_ID";
    pub const KNOWLEDGE_BASE_DATA_SOURCE_ID: &str = "KNOWLEDGE_BASE_DATA_SOURCE_ID";
    pub const BEDROCK_REGION: &str = "BEDROCK_REGION";
    pub const KNOWLEDGE_BASE_BUCKET: &str = "KNOWLEDGE_BASE_BUCKET";
    pub const KNOWLEDGE_BASE_FILES: &str = "KNOWLEDGE_BASE_FILES";
}

// ---------------------------------------------------------------------------
// Config structs (matching kbagent.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// AWS account-wide settings.
    #[serde(default)]
    pub aws: AwsConfig,

    /// CSV ingestion settings.
    #[serde(default)]
    pub ingest: IngestSettings,

    /// Knowledge query settings.
    #[serde(default)]
    pub query: QuerySettings,
}

/// `[aws]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".into()
}

/// `[ingest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    /// Target knowledge base. Required to run, but allowed to be unset here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base_id: Option<String>,

    /// Data source to start ingestion jobs on. Unset means dry run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,

    /// CSV files processed in order.
    #[serde(default = "default_csv_files")]
    pub csv_files: Vec<String>,

    /// Bucket referenced by the ingestion request's data source.
    #[serde(default = "default_bucket_arn")]
    pub bucket_arn: String,

    /// Key prefixes included by the data source.
    #[serde(default = "default_inclusion_prefixes")]
    pub inclusion_prefixes: Vec<String>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            knowledge_base_id: None,
            data_source_id: None,
            csv_files: default_csv_files(),
            bucket_arn: default_bucket_arn(),
            inclusion_prefixes: default_inclusion_prefixes(),
        }
    }
}

fn default_csv_files() -> Vec<String> {
    vec!["knowledge-bases/knowledge-base-1.csv".into()]
}
fn default_bucket_arn() -> String {
    "your-bucket-arn".into()
}
fn default_inclusion_prefixes() -> Vec<String> {
    vec!["your-prefix/".into()]
}

/// `[query]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Region for the model runtime; falls back to `[aws].region`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Bucket holding the knowledge-base files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Object keys concatenated into the prompt, in order.
    #[serde(default = "default_files")]
    pub files: Vec<String>,

    /// Model used when the event does not name one.
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Question used when the event does not carry one.
    #[serde(default = "default_prompt")]
    pub default_prompt: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            region: None,
            bucket: None,
            files: default_files(),
            model_id: default_model_id(),
            default_prompt: default_prompt(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_files() -> Vec<String> {
    vec!["knowledge-base-1.csv".into()]
}
fn default_model_id() -> String {
    "anthropic.claude-v2".into()
}
fn default_prompt() -> String {
    "Hello from Lambda!".into()
}
fn default_max_tokens() -> u32 {
    256
}
fn default_temperature() -> f32 {
    0.5
}

// ---------------------------------------------------------------------------
// Environment overrides
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Apply overrides using `lookup` as the environment.
    ///
    /// Empty values count as unset.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(region) = get(env_vars::AWS_REGION) {
            self.aws.region = region;
        }
        if let Some(id) = get(env_vars::KNOWLEDGE_BASE_ID) {
            self.ingest.knowledge_base_id = Some(id);
        }
        if let Some(id) = get(env_vars::KNOWLEDGE_BASE_DATA_SOURCE_ID) {
            self.ingest.data_source_id = Some(id);
        }
        if let Some(region) = get(env_vars::BEDROCK_REGION) {
            self.query.region = Some(region);
        }
        if let Some(bucket) = get(env_vars::KNOWLEDGE_BASE_BUCKET) {
            self.query.bucket = Some(bucket);
        }
        if let Some(raw) = get(env_vars::KNOWLEDGE_BASE_FILES) {
            let files = split_key_list(&raw);
            if files.is_empty() {
                tracing::warn!(
                    value = %raw,
                    kept = ?self.query.files,
                    "{} names no files, keeping configured list",
                    env_vars::KNOWLEDGE_BASE_FILES
                );
            } else {
                self.query.files = files;
            }
        }
    }
}

/// Split a comma-separated key list, trimming segments and dropping empties.
pub fn split_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + env + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime ingestion configuration.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub region: String,
    pub knowledge_base_id: Option<String>,
    pub data_source_id: Option<String>,
    pub csv_files: Vec<PathBuf>,
    pub bucket_arn: String,
    pub inclusion_prefixes: Vec<String>,
}

impl IngestConfig {
    /// The target knowledge base, or a config error when unset.
    pub fn knowledge_base_id(&self) -> Result<&str> {
        self.knowledge_base_id
            .as_deref()
            .ok_or_else(|| KbAgentError::config(missing_var(env_vars::KNOWLEDGE_BASE_ID)))
    }
}

impl From<&AppConfig> for IngestConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            region: config.aws.region.clone(),
            knowledge_base_id: config.ingest.knowledge_base_id.clone(),
            data_source_id: config.ingest.data_source_id.clone(),
            csv_files: config.ingest.csv_files.iter().map(PathBuf::from).collect(),
            bucket_arn: config.ingest.bucket_arn.clone(),
            inclusion_prefixes: config.ingest.inclusion_prefixes.clone(),
        }
    }
}

/// Runtime query configuration.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub region: String,
    pub bucket: Option<String>,
    pub files: Vec<String>,
    pub model_id: String,
    pub default_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl QueryConfig {
    /// The knowledge-base bucket, or a config error when unset.
    pub fn bucket(&self) -> Result<&str> {
        self.bucket
            .as_deref()
            .ok_or_else(|| KbAgentError::config(missing_var(env_vars::KNOWLEDGE_BASE_BUCKET)))
    }
}

impl From<&AppConfig> for QueryConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            region: config
                .query
                .region
                .clone()
                .unwrap_or_else(|| config.aws.region.clone()),
            bucket: config.query.bucket.clone(),
            files: config.query.files.clone(),
            model_id: config.query.model_id.clone(),
            default_prompt: config.query.default_prompt.clone(),
            max_tokens: config.query.max_tokens,
            temperature: config.query.temperature,
        }
    }
}

fn missing_var(name: &str) -> String {
    format!("please set the {name} environment variable")
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.kbagent/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| KbAgentError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.kbagent/kbagent.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does
/// not exist or the home directory cannot be determined.
pub fn load_config() -> Result<AppConfig> {
    let path = match config_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no config location, using defaults");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| KbAgentError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| KbAgentError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| KbAgentError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| KbAgentError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| KbAgentError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

//! Shared types, error model, and configuration for kbagent.
//!
//! This crate is the foundation depended on by all other kbagent crates.
//! It provides:
//! - [`KbAgentError`] — the unified error type
//! - Domain types ([`Row`], [`IngestionJobRequest`], [`ModelRequest`],
//!   [`QueryEvent`], [`HandlerResponse`])
//! - Configuration ([`AppConfig`], [`IngestConfig`], [`QueryConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, AwsConfig, IngestConfig, IngestSettings, QueryConfig, QuerySettings, config_dir,
    config_file_path, env_vars, init_config, load_config, load_config_from, split_key_list,
};
pub use error::{KbAgentError, Result};
pub use types::{
    DataSource, DataSourceConfiguration, DataSourceKind, FormattedDocument, HandlerResponse,
    IngestionJobRequest, ModelRequest, QueryEvent, Row, S3Configuration,
};

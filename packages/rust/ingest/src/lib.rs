//! CSV ingestion into a managed knowledge base.
//!
//! The pipeline is `reader` → `format` → `submitter`:
//! - [`reader`] — CSV file to ordered [`Row`](kbagent_shared::Row)s
//! - [`format`] — row to `key: value` text
//! - [`submitter`] — per-document ingestion with isolated failures
//! - [`bedrock`] — Bedrock Agent backed [`IngestionClient`]
//! - [`run`] — the multi-file run driven by the CLI

pub mod bedrock;
pub mod format;
pub mod reader;
pub mod run;
pub mod submitter;

pub use bedrock::BedrockAgentIngestionClient;
pub use format::{format_row, format_rows};
pub use reader::{read_csv, read_rows};
pub use run::{FileReport, FileStatus, ingest_csv, ingest_files};
pub use submitter::{
    DocumentOutcome, DryRunIngestionClient, IngestProgress, IngestionClient, IngestionReport,
    IngestionSubmitter, SilentProgress,
};

//! Multi-file ingestion run: every configured CSV file, in order.

use std::path::{Path, PathBuf};
use std::time::Instant;

use kbagent_shared::{IngestConfig, IngestionJobRequest, Result};
use tracing::{info, instrument};

use crate::format::format_rows;
use crate::reader::read_csv;
use crate::submitter::{IngestProgress, IngestionClient, IngestionReport, IngestionSubmitter};

/// What happened to one configured CSV file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
}

#[derive(Debug, Clone)]
pub enum FileStatus {
    /// The file did not exist and was skipped.
    Missing,
    /// The file was read and every row submitted.
    Ingested(IngestionReport),
}

/// Ingest every configured CSV file.
///
/// Refuses to start without a knowledge base id. Missing files are logged
/// and skipped; a file that cannot be read or parsed aborts the run.
#[instrument(skip_all, fields(client = client.name(), files = config.csv_files.len()))]
pub async fn ingest_files(
    config: &IngestConfig,
    client: &dyn IngestionClient,
    progress: &dyn IngestProgress,
) -> Result<Vec<FileReport>> {
    let start = Instant::now();
    let knowledge_base_id = config.knowledge_base_id()?;

    let request = IngestionJobRequest::s3(
        knowledge_base_id,
        config.bucket_arn.clone(),
        config.inclusion_prefixes.clone(),
    );
    let submitter = IngestionSubmitter::new(client, request);

    let mut reports = Vec::with_capacity(config.csv_files.len());
    for path in &config.csv_files {
        if !path.exists() {
            info!("CSV file {} not found", path.display());
            reports.push(FileReport {
                path: path.clone(),
                status: FileStatus::Missing,
            });
            continue;
        }

        info!("Ingesting data from {}", path.display());
        let report = ingest_csv(path, &submitter, progress).await?;
        reports.push(FileReport {
            path: path.clone(),
            status: FileStatus::Ingested(report),
        });
    }

    info!(
        files = reports.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "ingestion run complete"
    );

    Ok(reports)
}

/// Read, format, and submit a single CSV file.
pub async fn ingest_csv(
    path: &Path,
    submitter: &IngestionSubmitter<'_>,
    progress: &dyn IngestProgress,
) -> Result<IngestionReport> {
    info!("Reading data from {}", path.display());
    let rows = read_csv(path)?;
    let documents = format_rows(&rows);

    progress.file_started(path, documents.len());
    Ok(submitter.submit_all(&documents, progress).await)
}

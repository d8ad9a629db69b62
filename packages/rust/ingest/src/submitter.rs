//! Per-document ingestion submission.
//!
//! Every document is attempted exactly once, in order. A failure is logged
//! and recorded in the [`IngestionReport`]; it never stops the documents
//! after it.

use std::path::Path;

use async_trait::async_trait;
use kbagent_shared::{FormattedDocument, IngestionJobRequest, KbAgentError, Result};
use tracing::{debug, error, info};

// ---------------------------------------------------------------------------
// Client seam
// ---------------------------------------------------------------------------

/// Something that can start a knowledge-base ingestion job.
#[async_trait]
pub trait IngestionClient: Send + Sync {
    /// Start one ingestion job. Returns the job id when the service assigns one.
    async fn start_ingestion_job(&self, request: &IngestionJobRequest) -> Result<Option<String>>;

    /// Human-readable client name for tracing.
    fn name(&self) -> &str;
}

/// Logs the request it would send and reports success.
///
/// Used when no data source is configured.
pub struct DryRunIngestionClient;

#[async_trait]
impl IngestionClient for DryRunIngestionClient {
    async fn start_ingestion_job(&self, request: &IngestionJobRequest) -> Result<Option<String>> {
        let json = serde_json::to_string(request)
            .map_err(|e| KbAgentError::Ingestion(e.to_string()))?;
        info!(request = %json, "dry run: ingestion job not started");
        Ok(None)
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of submitting one document. `index` is 1-based, matching the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Submitted { index: usize, job_id: Option<String> },
    Failed { index: usize, error: String },
}

impl DocumentOutcome {
    pub fn index(&self) -> usize {
        match self {
            Self::Submitted { index, .. } | Self::Failed { index, .. } => *index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

/// Outcomes for one batch of documents, in submission order.
#[derive(Debug, Clone, Default)]
pub struct IngestionReport {
    pub outcomes: Vec<DocumentOutcome>,
}

impl IngestionReport {
    pub fn submitted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.submitted()
    }

    /// 1-based indices of the documents that failed.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(DocumentOutcome::index)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting ingestion status.
pub trait IngestProgress: Send + Sync {
    /// Called once a CSV file has been read and formatted.
    fn file_started(&self, path: &Path, documents: usize);
    /// Called before a document is submitted.
    fn document_started(&self, current: usize, total: usize);
    /// Called after a document's outcome is known.
    fn document_finished(&self, outcome: &DocumentOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl IngestProgress for SilentProgress {
    fn file_started(&self, _path: &Path, _documents: usize) {}
    fn document_started(&self, _current: usize, _total: usize) {}
    fn document_finished(&self, _outcome: &DocumentOutcome) {}
}

// ---------------------------------------------------------------------------
// Submitter
// ---------------------------------------------------------------------------

/// Submits formatted documents one at a time against a fixed request.
pub struct IngestionSubmitter<'a> {
    client: &'a dyn IngestionClient,
    request: IngestionJobRequest,
}

impl<'a> IngestionSubmitter<'a> {
    pub fn new(client: &'a dyn IngestionClient, request: IngestionJobRequest) -> Self {
        Self { client, request }
    }

    /// The request sent for every document.
    pub fn request(&self) -> &IngestionJobRequest {
        &self.request
    }

    /// Attempt every document in order and report each outcome.
    pub async fn submit_all(
        &self,
        documents: &[FormattedDocument],
        progress: &dyn IngestProgress,
    ) -> IngestionReport {
        let total = documents.len();
        info!(
            client = self.client.name(),
            knowledge_base_id = %self.request.knowledge_base_id,
            "Ingesting {total} documents into knowledge base..."
        );

        let mut report = IngestionReport {
            outcomes: Vec::with_capacity(total),
        };

        for (i, document) in documents.iter().enumerate() {
            let index = i + 1;
            progress.document_started(index, total);
            info!("Processing document {index}/{total}");
            debug!(index, chars = document.len(), "document content");

            let outcome = match self.client.start_ingestion_job(&self.request).await {
                Ok(job_id) => {
                    info!(job_id = job_id.as_deref(), "Successfully processed document {index}");
                    DocumentOutcome::Submitted { index, job_id }
                }
                Err(e) => {
                    error!("Error processing document {index}: {e}");
                    DocumentOutcome::Failed {
                        index,
                        error: e.to_string(),
                    }
                }
            };

            progress.document_finished(&outcome);
            report.outcomes.push(outcome);
        }

        info!(
            submitted = report.submitted(),
            failed = report.failed(),
            "ingestion batch complete"
        );

        report
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Counts calls and fails on the listed 1-based call numbers.
    #[derive(Default)]
    pub(crate) struct ScriptedClient {
        pub calls: AtomicUsize,
        pub fail_on: Vec<usize>,
        pub seen: Mutex<Vec<IngestionJobRequest>>,
    }

    #[async_trait]
    impl IngestionClient for ScriptedClient {
        async fn start_ingestion_job(
            &self,
            request: &IngestionJobRequest,
        ) -> Result<Option<String>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.seen.lock().unwrap().push(request.clone());
            if self.fail_on.contains(&call) {
                return Err(KbAgentError::Ingestion(format!("throttled on call {call}")));
            }
            Ok(Some(format!("job-{call}")))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        started: Mutex<Vec<(usize, usize)>>,
        finished: Mutex<Vec<DocumentOutcome>>,
    }

    impl IngestProgress for RecordingProgress {
        fn file_started(&self, _path: &Path, _documents: usize) {}
        fn document_started(&self, current: usize, total: usize) {
            self.started.lock().unwrap().push((current, total));
        }
        fn document_finished(&self, outcome: &DocumentOutcome) {
            self.finished.lock().unwrap().push(outcome.clone());
        }
    }

    fn request() -> IngestionJobRequest {
        IngestionJobRequest::s3("KB1", "arn:aws:s3:::kb", vec!["docs/".into()])
    }

    fn docs(n: usize) -> Vec<FormattedDocument> {
        (1..=n).map(|i| format!("id: {i}")).collect()
    }

    #[tokio::test]
    async fn all_documents_submitted_in_order() {
        let client = ScriptedClient::default();
        let progress = RecordingProgress::default();
        let submitter = IngestionSubmitter::new(&client, request());

        let report = submitter.submit_all(&docs(3), &progress).await;

        assert_eq!(report.submitted(), 3);
        assert_eq!(report.failed(), 0);
        assert_eq!(
            report.outcomes[2],
            DocumentOutcome::Submitted {
                index: 3,
                job_id: Some("job-3".into())
            }
        );
        assert_eq!(*progress.started.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn failure_does_not_stop_later_documents() {
        let client = ScriptedClient {
            fail_on: vec![2],
            ..Default::default()
        };
        let progress = RecordingProgress::default();
        let submitter = IngestionSubmitter::new(&client, request());

        let report = submitter.submit_all(&docs(4), &progress).await;

        assert_eq!(client.calls.load(Ordering::SeqCst), 4);
        assert_eq!(report.failed_indices(), vec![2]);
        assert_eq!(report.submitted(), 3);

        let indices: Vec<usize> = report.outcomes.iter().map(DocumentOutcome::index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);

        match &report.outcomes[1] {
            DocumentOutcome::Failed { error, .. } => assert!(error.contains("throttled on call 2")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(progress.finished.lock().unwrap().len(), 4);
    }

    /// Shared buffer for captured log output.
    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .map(String::from)
                .collect()
        }
    }

    #[tokio::test]
    async fn one_error_line_per_failed_document() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = ScriptedClient {
            fail_on: vec![2],
            ..Default::default()
        };
        IngestionSubmitter::new(&client, request())
            .submit_all(&docs(3), &SilentProgress)
            .await;

        let lines = logs.lines();
        let errors: Vec<&String> = lines.iter().filter(|l| l.contains("ERROR")).collect();
        assert_eq!(errors.len(), 1, "log output: {lines:#?}");
        assert!(errors[0].contains("Error processing document 2: "));
        assert!(errors[0].contains("throttled on call 2"));

        assert!(lines.iter().any(|l| l.contains("Ingesting 3 documents into knowledge base...")));
        assert!(lines.iter().any(|l| l.contains("Processing document 3/3")));
        assert!(lines.iter().any(|l| l.contains("Successfully processed document 1")));
        assert!(lines.iter().any(|l| l.contains("Successfully processed document 3")));
        assert!(!lines.iter().any(|l| l.contains("Successfully processed document 2")));
    }

    #[tokio::test]
    async fn every_document_sends_the_same_request() {
        let client = ScriptedClient::default();
        let submitter = IngestionSubmitter::new(&client, request());

        submitter.submit_all(&docs(3), &SilentProgress).await;

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|r| *r == request()));
    }

    #[tokio::test]
    async fn empty_batch_makes_no_calls() {
        let client = ScriptedClient::default();
        let submitter = IngestionSubmitter::new(&client, request());

        let report = submitter.submit_all(&[], &SilentProgress).await;

        assert!(report.outcomes.is_empty());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dry_run_always_succeeds() {
        let submitter = IngestionSubmitter::new(&DryRunIngestionClient, request());
        let report = submitter.submit_all(&docs(2), &SilentProgress).await;
        assert_eq!(report.submitted(), 2);
        assert!(matches!(
            report.outcomes[0],
            DocumentOutcome::Submitted { job_id: None, .. }
        ));
    }
}

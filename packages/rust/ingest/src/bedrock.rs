//! Bedrock Agent backed ingestion client.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockagent::Client;
use aws_sdk_bedrockagent::error::DisplayErrorContext;
use kbagent_shared::{IngestionJobRequest, KbAgentError, Result};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::submitter::IngestionClient;

/// Starts ingestion jobs on an existing knowledge-base data source.
///
/// The data source already knows its bucket and prefixes, so only the
/// knowledge base id from the request is sent; the rest is logged.
pub struct BedrockAgentIngestionClient {
    client: Client,
    data_source_id: String,
}

impl BedrockAgentIngestionClient {
    pub fn new(client: Client, data_source_id: impl Into<String>) -> Self {
        Self {
            client,
            data_source_id: data_source_id.into(),
        }
    }

    /// Build the SDK client from a loaded AWS config.
    pub fn from_conf(sdk_config: &SdkConfig, data_source_id: impl Into<String>) -> Self {
        Self::new(Client::new(sdk_config), data_source_id)
    }
}

#[async_trait]
impl IngestionClient for BedrockAgentIngestionClient {
    #[instrument(skip_all, fields(knowledge_base_id = %request.knowledge_base_id, data_source_id = %self.data_source_id))]
    async fn start_ingestion_job(&self, request: &IngestionJobRequest) -> Result<Option<String>> {
        let s3 = &request.data_source.data_source_configuration.s3_configuration;
        debug!(
            bucket_arn = %s3.bucket_arn,
            prefixes = ?s3.inclusion_prefixes,
            "starting ingestion job"
        );

        let output = self
            .client
            .start_ingestion_job()
            .knowledge_base_id(&request.knowledge_base_id)
            .data_source_id(&self.data_source_id)
            .client_token(Uuid::now_v7().to_string())
            .send()
            .await
            .map_err(|e| KbAgentError::Ingestion(DisplayErrorContext(&e).to_string()))?;

        Ok(output
            .ingestion_job()
            .map(|job| job.ingestion_job_id().to_string()))
    }

    fn name(&self) -> &str {
        "bedrock-agent"
    }
}

//! Bedrock Runtime backed [`ModelClient`].

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::config::{Builder, Region};
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use kbagent_shared::{KbAgentError, Result};
use tracing::instrument;

use crate::invoke::ModelClient;

const JSON: &str = "application/json";

pub struct BedrockModelClient {
    client: Client,
}

impl BedrockModelClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the SDK client from a loaded AWS config, pinned to `region`.
    pub fn from_conf(sdk_config: &SdkConfig, region: impl Into<String>) -> Self {
        let config = Builder::from(sdk_config)
            .region(Region::new(region.into()))
            .build();
        Self::new(Client::from_conf(config))
    }
}

#[async_trait]
impl ModelClient for BedrockModelClient {
    #[instrument(skip(self, body), fields(bytes = body.len()))]
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .body(Blob::new(body))
            .content_type(JSON)
            .accept(JSON)
            .send()
            .await
            .map_err(|e| KbAgentError::Invocation(DisplayErrorContext(&e).to_string()))?;

        Ok(output.body.into_inner())
    }
}

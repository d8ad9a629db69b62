//! S3 backed [`ObjectStore`].

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use kbagent_shared::{KbAgentError, Result};
use tracing::instrument;

use crate::fetch::ObjectStore;

pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the SDK client from a loaded AWS config.
    pub fn from_conf(sdk_config: &SdkConfig) -> Self {
        Self::new(Client::new(sdk_config))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self))]
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .is_some_and(|service| service.is_no_such_key());
                if missing {
                    KbAgentError::not_found(format!("s3://{bucket}/{key}"))
                } else {
                    KbAgentError::Storage(format!(
                        "s3://{bucket}/{key}: {}",
                        DisplayErrorContext(&e)
                    ))
                }
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| KbAgentError::Storage(format!("s3://{bucket}/{key}: {e}")))?;

        Ok(body.into_bytes().to_vec())
    }
}

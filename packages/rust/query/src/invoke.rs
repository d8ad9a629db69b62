//! Hosted model invocation.

use async_trait::async_trait;
use kbagent_shared::{KbAgentError, ModelRequest, Result};
use serde::Serialize;
use tracing::{info, instrument};

/// A hosted text-generation model endpoint.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send a JSON request body to `model_id` and return the raw response body.
    ///
    /// Provider failures must surface as [`KbAgentError::Invocation`].
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

/// Text-completion request body.
#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    prompt: &'a str,
    max_tokens_to_sample: u32,
    temperature: f32,
}

/// Serialize the JSON body sent to the model.
pub fn request_body(request: &ModelRequest) -> Result<Vec<u8>> {
    let body = CompletionBody {
        prompt: &request.prompt,
        max_tokens_to_sample: request.max_tokens,
        temperature: request.temperature,
    };
    serde_json::to_vec(&body)
        .map_err(|e| KbAgentError::Invocation(format!("failed to serialize request: {e}")))
}

/// Invoke the model and return its response body as text, unparsed.
#[instrument(skip_all, fields(model_id = %request.model_id, max_tokens = request.max_tokens))]
pub async fn invoke_model(client: &dyn ModelClient, request: &ModelRequest) -> Result<String> {
    let body = request_body(request)?;
    let response = client.invoke(&request.model_id, body).await?;

    info!(bytes = response.len(), "model responded");

    String::from_utf8(response)
        .map_err(|e| KbAgentError::encoding(format!("model {}", request.model_id), e.to_string()))
}

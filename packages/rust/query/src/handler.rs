//! Request handler: event in, status-coded response out.
//!
//! The handler never fails. Any error, including a malformed event, is
//! logged and flattened into a 500 [`HandlerResponse`] carrying the message
//! and error kind.

use kbagent_shared::{HandlerResponse, KbAgentError, QueryConfig, QueryEvent, Result};
use tracing::{error, info, instrument};

use crate::client::KnowledgeQuery;
use crate::fetch::ObjectStore;
use crate::invoke::ModelClient;

/// An event with every default filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub model_id: String,
    pub question: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Apply configured defaults to the optional event fields.
///
/// A present but empty `prompt` is kept as-is.
pub fn resolve_event(event: QueryEvent, config: &QueryConfig) -> ResolvedQuery {
    ResolvedQuery {
        model_id: event.model_id.unwrap_or_else(|| config.model_id.clone()),
        question: event
            .prompt
            .unwrap_or_else(|| config.default_prompt.clone()),
        max_tokens: event.max_tokens.unwrap_or(config.max_tokens),
        temperature: event.temperature.unwrap_or(config.temperature),
    }
}

/// Decode a raw event into a [`QueryEvent`].
pub fn parse_event(raw: serde_json::Value) -> Result<QueryEvent> {
    serde_json::from_value(raw).map_err(|e| KbAgentError::parse(format!("invalid event: {e}")))
}

/// Answer one untyped event, as delivered by the function runtime.
pub async fn handle_raw(
    raw: serde_json::Value,
    config: &QueryConfig,
    store: &dyn ObjectStore,
    model: &dyn ModelClient,
) -> HandlerResponse {
    match parse_event(raw) {
        Ok(event) => handle(event, config, store, model).await,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "rejected event");
            HandlerResponse::failure(&e)
        }
    }
}

/// Answer one event.
#[instrument(skip_all)]
pub async fn handle(
    event: QueryEvent,
    config: &QueryConfig,
    store: &dyn ObjectStore,
    model: &dyn ModelClient,
) -> HandlerResponse {
    match answer(event, config, store, model).await {
        Ok(body) => {
            info!(bytes = body.len(), "query answered");
            HandlerResponse::ok(body)
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, "query failed");
            HandlerResponse::failure(&e)
        }
    }
}

async fn answer(
    event: QueryEvent,
    config: &QueryConfig,
    store: &dyn ObjectStore,
    model: &dyn ModelClient,
) -> Result<String> {
    let resolved = resolve_event(event, config);
    let bucket = config.bucket()?;

    info!(model_id = %resolved.model_id, bucket, "handling query");

    KnowledgeQuery::new(store, model, bucket, config.files.clone())
        .ask(
            &resolved.question,
            &resolved.model_id,
            resolved.max_tokens,
            resolved.temperature,
        )
        .await
}

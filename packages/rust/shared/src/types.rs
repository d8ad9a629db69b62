//! Core domain types for the ingestion and query pipelines.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::KbAgentError;

// ---------------------------------------------------------------------------
// Ingestion side
// ---------------------------------------------------------------------------

/// One CSV data line keyed by the header row, in column order.
///
/// A duplicated header keeps its first position and the last value.
pub type Row = IndexMap<String, String>;

/// A row flattened to `k1: v1 k2: v2 ...` text.
pub type FormattedDocument = String;

/// Request to start an ingestion job against a knowledge base.
///
/// The shape is fixed: every document in a run produces an identical request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionJobRequest {
    pub knowledge_base_id: String,
    pub data_source: DataSource,
}

impl IngestionJobRequest {
    /// Build a request pointing at an S3 data source.
    pub fn s3(
        knowledge_base_id: impl Into<String>,
        bucket_arn: impl Into<String>,
        inclusion_prefixes: Vec<String>,
    ) -> Self {
        Self {
            knowledge_base_id: knowledge_base_id.into(),
            data_source: DataSource {
                kind: DataSourceKind::S3,
                data_source_configuration: DataSourceConfiguration {
                    s3_configuration: S3Configuration {
                        bucket_arn: bucket_arn.into(),
                        inclusion_prefixes,
                    },
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
    pub data_source_configuration: DataSourceConfiguration,
}

/// Storage kind backing a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSourceKind {
    #[serde(rename = "S3")]
    S3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfiguration {
    pub s3_configuration: S3Configuration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Configuration {
    pub bucket_arn: String,
    pub inclusion_prefixes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Query side
// ---------------------------------------------------------------------------

/// A fully resolved call to a hosted model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// Hosted model identifier (e.g. `anthropic.claude-v2`).
    pub model_id: String,
    /// The assembled prompt envelope.
    pub prompt: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Incoming request-handler event. Every field is optional; defaults are
/// applied at the boundary before a [`ModelRequest`] is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Request-handler response.
///
/// The failure form carries `error` instead of `body`, matching what existing
/// callers of the handler already parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandlerResponse {
    Success {
        #[serde(rename = "statusCode")]
        status_code: u16,
        body: String,
    },
    Failure {
        #[serde(rename = "statusCode")]
        status_code: u16,
        error: String,
        #[serde(rename = "errorKind")]
        error_kind: String,
    },
}

impl HandlerResponse {
    /// 200 response wrapping the raw model output.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Success {
            status_code: 200,
            body: body.into(),
        }
    }

    /// 500 response carrying the error message and its kind.
    ///
    /// `error` holds [`KbAgentError::message`]; the kind travels separately.
    pub fn failure(err: &KbAgentError) -> Self {
        Self::Failure {
            status_code: 500,
            error: err.message(),
            error_kind: err.kind().to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success { status_code, .. } | Self::Failure { status_code, .. } => *status_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingestion_request_serializes_to_fixed_shape() {
        let req = IngestionJobRequest::s3("KB123", "arn:aws:s3:::kb", vec!["docs/".into()]);
        let json = serde_json::to_value(&req).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "knowledgeBaseId": "KB123",
                "dataSource": {
                    "type": "S3",
                    "dataSourceConfiguration": {
                        "s3Configuration": {
                            "bucketArn": "arn:aws:s3:::kb",
                            "inclusionPrefixes": ["docs/"]
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn query_event_fields_are_optional() {
        let event: QueryEvent = serde_json::from_str("{}").expect("parse empty event");
        assert_eq!(event, QueryEvent::default());

        let event: QueryEvent =
            serde_json::from_str(r#"{"prompt":"What is X?","unrelated":true}"#).expect("parse");
        assert_eq!(event.prompt.as_deref(), Some("What is X?"));
        assert!(event.model_id.is_none());
    }

    #[test]
    fn handler_response_shapes() {
        let ok = serde_json::to_value(HandlerResponse::ok("{\"completion\":\"hi\"}")).unwrap();
        assert_eq!(ok["statusCode"], 200);
        assert_eq!(ok["body"], "{\"completion\":\"hi\"}");

        let err = KbAgentError::Invocation("throttled".into());
        let fail = serde_json::to_value(HandlerResponse::failure(&err)).unwrap();
        assert_eq!(fail["statusCode"], 500);
        assert_eq!(fail["error"], "throttled");
        assert_eq!(fail["errorKind"], "invocation");
        assert!(fail.get("body").is_none());
    }
}

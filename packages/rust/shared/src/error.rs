//! Error types for kbagent.
//!
//! Library crates use [`KbAgentError`] via `thiserror`.
//! The CLI wraps this with `color-eyre`; the Lambda handler flattens it
//! into a 500 response carrying the message and [`KbAgentError::kind`].

use std::path::PathBuf;

/// Top-level error type for all kbagent operations.
#[derive(Debug, thiserror::Error)]
pub enum KbAgentError {
    /// A required identifier or setting is missing or invalid.
    #[error("config error: {message}")]
    Config { message: String },

    /// A local file or a remote object does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// Content is not valid UTF-8.
    #[error("encoding error in {source_name}: {message}")]
    Encoding {
        source_name: String,
        message: String,
    },

    /// Hosted model invocation failed (auth, quota, bad request, unavailable).
    #[error("model invocation failed: {0}")]
    Invocation(String),

    /// A single document could not be submitted for ingestion.
    #[error("ingestion error: {0}")]
    Ingestion(String),

    /// Object-store failure other than a missing object.
    #[error("storage error: {0}")]
    Storage(String),

    /// CSV or JSON syntax error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KbAgentError>;

impl KbAgentError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a not-found error naming the missing file or object.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an encoding error for content read from `source_name`.
    pub fn encoding(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Encoding {
            source_name: source_name.into(),
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "configuration",
            Self::NotFound { .. } => "not_found",
            Self::Encoding { .. } => "encoding",
            Self::Invocation(_) => "invocation",
            Self::Ingestion(_) => "ingestion",
            Self::Storage(_) => "storage",
            Self::Parse { .. } => "parse",
            Self::Io { .. } => "io",
        }
    }

    /// The underlying message without the kind prefix added by `Display`.
    ///
    /// Variants whose payload alone does not describe the failure
    /// (missing item, bad encoding, I/O) keep their full display text.
    pub fn message(&self) -> String {
        match self {
            Self::Config { message } | Self::Parse { message } => message.clone(),
            Self::Invocation(message) | Self::Ingestion(message) | Self::Storage(message) => {
                message.clone()
            }
            Self::NotFound { .. } | Self::Encoding { .. } | Self::Io { .. } => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = KbAgentError::config("KNOWLEDGE_BASE_ID is not set");
        assert_eq!(err.to_string(), "config error: KNOWLEDGE_BASE_ID is not set");

        let err = KbAgentError::not_found("s3://kb-bucket/a.csv");
        assert!(err.to_string().contains("s3://kb-bucket/a.csv"));

        let err = KbAgentError::encoding("a.csv", "invalid utf-8 sequence of 1 bytes from index 3");
        assert!(err.to_string().starts_with("encoding error in a.csv"));
    }

    #[test]
    fn error_kinds_are_stable() {
        assert_eq!(KbAgentError::config("x").kind(), "configuration");
        assert_eq!(KbAgentError::not_found("x").kind(), "not_found");
        assert_eq!(KbAgentError::encoding("x", "y").kind(), "encoding");
        assert_eq!(KbAgentError::Invocation("x".into()).kind(), "invocation");
        assert_eq!(KbAgentError::Ingestion("x".into()).kind(), "ingestion");
        assert_eq!(
            KbAgentError::io("/tmp/x", std::io::Error::other("boom")).kind(),
            "io"
        );
    }

    #[test]
    fn message_drops_the_kind_prefix() {
        let err = KbAgentError::Invocation("ThrottlingException: rate exceeded".into());
        assert_eq!(err.message(), "ThrottlingException: rate exceeded");

        let err = KbAgentError::config("KNOWLEDGE_BASE_BUCKET is not set");
        assert_eq!(err.message(), "KNOWLEDGE_BASE_BUCKET is not set");

        let err = KbAgentError::not_found("s3://kb/a.csv");
        assert_eq!(err.message(), "not found: s3://kb/a.csv");
    }
}

//! Knowledge-base question answering over a hosted model.
//!
//! The pipeline is `fetch` → `prompt` → `invoke`, wrapped by [`KnowledgeQuery`]
//! and exposed to entry points through [`handler::handle`].

pub mod bedrock;
pub mod client;
pub mod fetch;
pub mod handler;
pub mod invoke;
pub mod prompt;
pub mod s3;

pub use bedrock::BedrockModelClient;
pub use client::KnowledgeQuery;
pub use fetch::{ObjectStore, fetch_knowledge};
pub use handler::{ResolvedQuery, handle, handle_raw, parse_event, resolve_event};
pub use invoke::{ModelClient, invoke_model, request_body};
pub use prompt::build_prompt;
pub use s3::S3ObjectStore;

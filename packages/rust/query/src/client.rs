//! Query orchestration: fetch → prompt → invoke.

use kbagent_shared::{ModelRequest, Result};
use tracing::{info, instrument};

use crate::fetch::{ObjectStore, fetch_knowledge};
use crate::invoke::{ModelClient, invoke_model};
use crate::prompt::build_prompt;

/// Answers questions against a fixed list of knowledge-base files.
///
/// Holds no state between calls; every [`ask`](Self::ask) refetches the files.
pub struct KnowledgeQuery<'a> {
    store: &'a dyn ObjectStore,
    model: &'a dyn ModelClient,
    bucket: String,
    files: Vec<String>,
}

impl<'a> KnowledgeQuery<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        model: &'a dyn ModelClient,
        bucket: impl Into<String>,
        files: Vec<String>,
    ) -> Self {
        Self {
            store,
            model,
            bucket: bucket.into(),
            files,
        }
    }

    /// Fetch the knowledge bundle, wrap it with `question`, and return the
    /// model's raw response body.
    #[instrument(skip(self, question), fields(bucket = %self.bucket, files = self.files.len()))]
    pub async fn ask(
        &self,
        question: &str,
        model_id: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let knowledge = fetch_knowledge(self.store, &self.bucket, &self.files).await?;
        let prompt = build_prompt(question, &knowledge);

        info!(
            knowledge_bytes = knowledge.len(),
            prompt_bytes = prompt.len(),
            "prompt assembled"
        );

        let request = ModelRequest {
            model_id: model_id.to_string(),
            prompt,
            max_tokens,
            temperature,
        };
        invoke_model(self.model, &request).await
    }
}

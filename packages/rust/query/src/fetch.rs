//! Knowledge-base file retrieval and concatenation.

use async_trait::async_trait;
use kbagent_shared::{KbAgentError, Result};
use tracing::{debug, instrument};

/// Key-addressed object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Return the full body of `bucket`/`key`.
    ///
    /// A missing object must surface as [`KbAgentError::NotFound`].
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

/// Fetch every key in order and join the bodies, each followed by `\n`.
///
/// The first missing or non-UTF-8 object aborts the fetch. No size limit is
/// applied.
#[instrument(skip_all, fields(bucket = %bucket, keys = keys.len()))]
pub async fn fetch_knowledge(store: &dyn ObjectStore, bucket: &str, keys: &[String]) -> Result<String> {
    let mut combined = String::new();

    for key in keys {
        let bytes = store.get_object(bucket, key).await?;
        let text = String::from_utf8(bytes)
            .map_err(|e| KbAgentError::encoding(format!("s3://{bucket}/{key}"), e.to_string()))?;

        debug!(key = %key, bytes = text.len(), "fetched knowledge file");
        combined.push_str(&text);
        combined.push('\n');
    }

    Ok(combined)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory store keyed by `bucket/key`.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        objects: HashMap<String, Vec<u8>>,
        pub requested: Mutex<Vec<String>>,
    }

    impl MemoryStore {
        pub(crate) fn with(objects: &[(&str, &[u8])]) -> Self {
            Self {
                objects: objects
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_vec()))
                    .collect(),
                requested: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
            let path = format!("{bucket}/{key}");
            self.requested.lock().unwrap().push(path.clone());
            self.objects
                .get(&path)
                .cloned()
                .ok_or_else(|| KbAgentError::not_found(format!("s3://{path}")))
        }
    }

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn concatenates_in_list_order() {
        let store = MemoryStore::with(&[("kb/a.csv", b"X"), ("kb/b.csv", b"Y")]);
        let combined = fetch_knowledge(&store, "kb", &keys(&["a.csv", "b.csv"]))
            .await
            .unwrap();
        assert_eq!(combined, "X\nY\n");

        let reversed = fetch_knowledge(&store, "kb", &keys(&["b.csv", "a.csv"]))
            .await
            .unwrap();
        assert_eq!(reversed, "Y\nX\n");
    }

    #[tokio::test]
    async fn no_keys_yields_empty_bundle() {
        let store = MemoryStore::default();
        assert_eq!(fetch_knowledge(&store, "kb", &[]).await.unwrap(), "");
    }

    #[tokio::test]
    async fn missing_object_aborts_without_fetching_the_rest() {
        let store = MemoryStore::with(&[("kb/a.csv", b"X"), ("kb/c.csv", b"Z")]);
        let err = fetch_knowledge(&store, "kb", &keys(&["a.csv", "b.csv", "c.csv"]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "not_found");
        assert!(err.to_string().contains("s3://kb/b.csv"));
        assert_eq!(*store.requested.lock().unwrap(), vec!["kb/a.csv", "kb/b.csv"]);
    }

    #[tokio::test]
    async fn non_utf8_object_is_an_encoding_error() {
        let store = MemoryStore::with(&[("kb/a.csv", &[0xc3, 0x28])]);
        let err = fetch_knowledge(&store, "kb", &keys(&["a.csv"]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "encoding");
    }
}

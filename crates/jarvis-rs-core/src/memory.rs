//! Best-effort adapter over the memory provider.

use jarvis_rs_memory::{MemoryProvider, MemoryRecord};
use jarvis_rs_protocol::StepOutcome;
use log::{debug, info, warn};
use std::sync::Arc;

/// Separator between recalled answers in the memory context.
const RECALL_SEPARATOR: &str = " ";

/// Saves answers and recalls related ones without ever failing a request.
#[derive(Clone)]
pub struct MemoryStore {
    provider: Arc<dyn MemoryProvider>,
    recall_k: usize,
}

impl MemoryStore {
    pub fn new(provider: Arc<dyn MemoryProvider>, recall_k: usize) -> Self {
        Self { provider, recall_k }
    }

    pub fn recall_k(&self) -> usize {
        self.recall_k
    }

    /// Upsert the answer under the hash of `prompt`.
    pub async fn save(&self, prompt: &str, answer: &str) -> StepOutcome<()> {
        let record = MemoryRecord::new(prompt, answer);
        let id = record.id.clone();
        match self.provider.upsert(record).await {
            Ok(()) => {
                info!(
                    "memory saved (id={}, prompt_preview={:?})",
                    id,
                    preview(prompt)
                );
                StepOutcome::Ok(())
            }
            Err(err) => {
                warn!("memory save failed (id={id}, err={err})");
                StepOutcome::degraded((), err)
            }
        }
    }

    /// Texts of the most similar stored answers joined by a space, or an empty
    /// string when nothing is stored.
    pub async fn retrieve(&self, query: &str) -> StepOutcome<String> {
        match self.provider.query(query, self.recall_k).await {
            Ok(matches) => {
                debug!(
                    "memory recall (k={}, matches={})",
                    self.recall_k,
                    matches.len()
                );
                let texts: Vec<&str> = matches
                    .iter()
                    .map(|entry| entry.record.text.as_str())
                    .collect();
                StepOutcome::Ok(texts.join(RECALL_SEPARATOR))
            }
            Err(err) => {
                warn!("memory recall failed (err={err})");
                StepOutcome::degraded(String::new(), err)
            }
        }
    }

    /// Stored record count, or 0 when the provider is unreachable.
    pub async fn count(&self) -> usize {
        match self.provider.count().await {
            Ok(count) => count,
            Err(err) => {
                warn!("memory count failed (err={err})");
                0
            }
        }
    }
}

/// First 40 characters of a prompt, for logs.
pub(crate) fn preview(prompt: &str) -> String {
    prompt.chars().take(40).collect()
}

#[cfg(test)]
mod tests {
    use super::{MemoryStore, preview};
    use async_trait::async_trait;
    use jarvis_rs_memory::{
        HashingEmbedder, MemoryError, MemoryMatch, MemoryProvider, MemoryRecord,
        VectorMemoryProvider, record_id,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait]
    impl MemoryProvider for Unreachable {
        async fn upsert(&self, _record: MemoryRecord) -> Result<(), MemoryError> {
            Err(MemoryError::Embedding("offline".to_string()))
        }

        async fn query(&self, _text: &str, _k: usize) -> Result<Vec<MemoryMatch>, MemoryError> {
            Err(MemoryError::Embedding("offline".to_string()))
        }

        async fn count(&self) -> Result<usize, MemoryError> {
            Err(MemoryError::Embedding("offline".to_string()))
        }
    }

    fn vector_store() -> (Arc<VectorMemoryProvider>, MemoryStore) {
        let provider = Arc::new(VectorMemoryProvider::in_memory(Arc::new(
            HashingEmbedder::new(64),
        )));
        let store = MemoryStore::new(provider.clone(), 3);
        (provider, store)
    }

    #[tokio::test]
    async fn saving_twice_keeps_one_record() {
        let (provider, store) = vector_store();
        assert!(!store.save("prompt", "answer").await.is_degraded());
        assert!(!store.save("prompt", "answer").await.is_degraded());
        let records = provider.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record_id("prompt"));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn retrieve_on_empty_store_is_empty_string() {
        let (_, store) = vector_store();
        assert_eq!(store.retrieve("anything").await.into_value(), "");
    }

    #[tokio::test]
    async fn retrieve_joins_matches_with_space() {
        let (_, store) = vector_store();
        store.save("a", "alpha").await;
        store.save("b", "beta").await;
        let recalled = store.retrieve("alpha").await.into_value();
        assert_eq!(recalled, "alpha beta");
    }

    #[tokio::test]
    async fn provider_failures_degrade_without_error() {
        let store = MemoryStore::new(Arc::new(Unreachable), 3);
        assert!(store.save("p", "a").await.is_degraded());
        let recalled = store.retrieve("p").await;
        assert!(recalled.is_degraded());
        assert_eq!(recalled.value(), "");
        assert_eq!(store.count().await, 0);
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(50);
        assert_eq!(preview(&long).chars().count(), 40);
        assert_eq!(preview("short"), "short");
    }
}

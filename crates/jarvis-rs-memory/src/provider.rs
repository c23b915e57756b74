//! Memory provider trait and the default vector store.

use crate::embedding::{Embedder, cosine_similarity};
use crate::error::MemoryError;
use crate::model::MemoryRecord;
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A recalled record and its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryMatch {
    pub record: MemoryRecord,
    pub score: f32,
}

#[async_trait]
/// Storage backend used by the memory store adapter.
pub trait MemoryProvider: Send + Sync {
    /// Insert a record, or overwrite the record with the same id.
    async fn upsert(&self, record: MemoryRecord) -> Result<(), MemoryError>;

    /// Return up to `k` records most similar to `text`, best first.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<MemoryMatch>, MemoryError>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize, MemoryError>;
}

struct StoredEntry {
    record: MemoryRecord,
    embedding: Vec<f32>,
}

/// In-process vector store with optional JSONL persistence.
///
/// Records are keyed by id so repeated saves for one prompt collapse into a
/// single entry. When a path is set, the full record set is rewritten
/// atomically on the blocking pool and the index only changes once the file
/// is in place; embeddings are recomputed on load.
pub struct VectorMemoryProvider {
    embedder: Arc<dyn Embedder>,
    entries: RwLock<BTreeMap<String, StoredEntry>>,
    path: Option<PathBuf>,
    /// Serialises upserts so each file rewrite sees the previous commit.
    write_gate: tokio::sync::Mutex<()>,
}

impl VectorMemoryProvider {
    /// Create an empty, non-persistent store.
    pub fn in_memory(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(BTreeMap::new()),
            path: None,
            write_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Open a store persisted at `path`, loading any existing records.
    pub async fn open(
        path: impl AsRef<Path>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let records = load_records(&path)?;
        let texts: Vec<String> = records.iter().map(|record| record.text.clone()).collect();
        let embeddings = embedder.embed(&texts).await?;
        if embeddings.len() != records.len() {
            return Err(MemoryError::Embedding(format!(
                "expected {} embeddings, got {}",
                records.len(),
                embeddings.len()
            )));
        }
        let entries: BTreeMap<String, StoredEntry> = records
            .into_iter()
            .zip(embeddings)
            .map(|(record, embedding)| (record.id.clone(), StoredEntry { record, embedding }))
            .collect();
        info!(
            "opened vector memory (path={}, records={})",
            path.display(),
            entries.len()
        );
        Ok(Self {
            embedder,
            entries: RwLock::new(entries),
            path: Some(path),
            write_gate: tokio::sync::Mutex::new(()),
        })
    }

    /// Snapshot of every stored record, ordered by id.
    pub fn records(&self) -> Vec<MemoryRecord> {
        self.entries
            .read()
            .values()
            .map(|entry| entry.record.clone())
            .collect()
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl MemoryProvider for VectorMemoryProvider {
    async fn upsert(&self, mut record: MemoryRecord) -> Result<(), MemoryError> {
        let embedding = self
            .embedder
            .embed(std::slice::from_ref(&record.text))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MemoryError::Embedding("empty embedding batch".to_string()))?;

        let _gate = self.write_gate.lock().await;
        let snapshot = {
            let entries = self.entries.read();
            if let Some(existing) = entries.get(&record.id) {
                record.created_at = existing.record.created_at;
            }
            self.path.as_ref().map(|_| {
                let mut records: BTreeMap<&str, &MemoryRecord> = entries
                    .values()
                    .map(|entry| (entry.record.id.as_str(), &entry.record))
                    .collect();
                records.insert(record.id.as_str(), &record);
                records.into_values().cloned().collect::<Vec<_>>()
            })
        };
        if let (Some(path), Some(records)) = (self.path.clone(), snapshot) {
            let temp_path = Self::temp_path(&path);
            tokio::task::spawn_blocking(move || write_records(&path, &temp_path, &records))
                .await??;
        }

        debug!(
            "memory upsert (id={}, text_len={})",
            record.id,
            record.text.len()
        );
        self.entries
            .write()
            .insert(record.id.clone(), StoredEntry { record, embedding });
        Ok(())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<MemoryMatch>, MemoryError> {
        let is_empty = self.entries.read().is_empty();
        if k == 0 || is_empty {
            return Ok(Vec::new());
        }
        let query = self
            .embedder
            .embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MemoryError::Embedding("empty embedding batch".to_string()))?;

        let entries = self.entries.read();
        let mut matches: Vec<MemoryMatch> = entries
            .values()
            .map(|entry| MemoryMatch {
                record: entry.record.clone(),
                score: cosine_similarity(&query, &entry.embedding),
            })
            .collect();
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.record.id.cmp(&b.record.id))
        });
        matches.truncate(k);
        debug!(
            "memory query (k={}, matches={}, stored={})",
            k,
            matches.len(),
            entries.len()
        );
        Ok(matches)
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.entries.read().len())
    }
}

fn load_records(path: &Path) -> Result<Vec<MemoryRecord>, MemoryError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = OpenOptions::new().read(true).open(path)?;
    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

/// Rewrite the record file via a temp file and rename.
fn write_records(
    path: &Path,
    temp_path: &Path,
    records: &[MemoryRecord],
) -> Result<(), MemoryError> {
    {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(temp_path)?;
        for record in records {
            let line = serde_json::to_string(record)?;
            writeln!(file, "{line}")?;
        }
        file.flush()?;
    }
    std::fs::rename(temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{MemoryProvider, VectorMemoryProvider};
    use crate::{HashingEmbedder, MemoryRecord};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn store() -> VectorMemoryProvider {
        VectorMemoryProvider::in_memory(Arc::new(HashingEmbedder::new(128)))
    }

    #[tokio::test]
    async fn empty_store_returns_no_matches() {
        let store = store();
        let matches = store.query("anything", 3).await.expect("query");
        assert!(matches.is_empty());
        assert_eq!(store.count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn upsert_same_prompt_keeps_one_record() {
        let store = store();
        let first = MemoryRecord::new("What is Rust?", "A language.");
        let created_at = first.created_at;
        store.upsert(first).await.expect("upsert");
        store
            .upsert(MemoryRecord::new("What is Rust?", "A systems language."))
            .await
            .expect("upsert");

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "A systems language.");
        assert_eq!(records[0].created_at, created_at);
    }

    #[tokio::test]
    async fn query_ranks_most_similar_first() {
        let store = store();
        for (prompt, answer) in [
            ("q1", "Paris is the capital of France."),
            ("q2", "Tokio is an async runtime for Rust."),
            ("q3", "Berlin is the capital of Germany."),
        ] {
            store
                .upsert(MemoryRecord::new(prompt, answer))
                .await
                .expect("upsert");
        }
        let matches = store.query("async runtime in Rust", 2).await.expect("query");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].record.text, "Tokio is an async runtime for Rust.");
        assert!(matches[0].score >= matches[1].score);
    }

    #[tokio::test]
    async fn k_larger_than_store_returns_everything() {
        let store = store();
        store
            .upsert(MemoryRecord::new("a", "first answer"))
            .await
            .expect("upsert");
        store
            .upsert(MemoryRecord::new("b", "second answer"))
            .await
            .expect("upsert");
        let matches = store.query("answer", 10).await.expect("query");
        assert_eq!(matches.len(), 2);
    }
}

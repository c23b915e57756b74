use async_trait::async_trait;
use jarvis_rs_memory::{MemoryError, MemoryMatch, MemoryProvider, MemoryRecord};
use parking_lot::Mutex;

/// Memory provider returning fixed recall texts and recording saves.
#[derive(Debug, Default)]
pub struct StubMemory {
    recall: Vec<String>,
    fail: bool,
    saved: Mutex<Vec<MemoryRecord>>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StubMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recall<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            recall: texts.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Every operation fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Vec<MemoryRecord> {
        self.saved.lock().clone()
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }

    fn check(&self) -> Result<(), MemoryError> {
        if self.fail {
            Err(MemoryError::Io(std::io::Error::other("stub memory offline")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MemoryProvider for StubMemory {
    async fn upsert(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        self.check()?;
        let mut saved = self.saved.lock();
        saved.retain(|existing| existing.id != record.id);
        saved.push(record);
        Ok(())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<MemoryMatch>, MemoryError> {
        self.queries.lock().push((text.to_string(), k));
        self.check()?;
        Ok(self
            .recall
            .iter()
            .take(k)
            .enumerate()
            .map(|(idx, text)| MemoryMatch {
                record: MemoryRecord::new(&format!("recall-{idx}"), text.clone()),
                score: 1.0 - idx as f32 * 0.1,
            })
            .collect())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        self.check()?;
        Ok(self.saved.lock().len())
    }
}

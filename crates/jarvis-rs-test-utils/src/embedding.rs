use async_trait::async_trait;
use jarvis_rs_memory::{Embedder, MemoryError};
use std::collections::HashMap;

/// Embedder with hand-picked vectors per text.
///
/// Texts without an explicit vector embed to the default vector.
#[derive(Debug, Clone)]
pub struct FixedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    default: Vec<f32>,
}

impl FixedEmbedder {
    pub fn new(default: Vec<f32>) -> Self {
        Self {
            vectors: HashMap::new(),
            default,
        }
    }

    pub fn with(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        Ok(texts
            .iter()
            .map(|text| {
                self.vectors
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| self.default.clone())
            })
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.default.len()
    }
}

//! Text embedding providers used by the vector memory store.

use crate::MemoryError;
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use log::{debug, info};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

/// Turns texts into fixed-length vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed every text, preserving input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError>;

    /// Length of every vector returned by `embed`.
    fn dimensions(&self) -> usize;
}

/// Local sentence-transformer embedder running on ONNX via fastembed.
///
/// The model is downloaded and loaded on the first `embed` call; inference runs
/// on the blocking pool.
pub struct FastEmbedder {
    model_name: EmbeddingModel,
    dimensions: usize,
    model: Arc<OnceCell<TextEmbedding>>,
}

/// Default local model; matches the 384-dimension MiniLM sentence encoder.
pub const DEFAULT_LOCAL_MODEL: &str = "all-MiniLM-L6-v2";

impl FastEmbedder {
    pub fn new(model_name: EmbeddingModel, dimensions: usize) -> Self {
        Self {
            model_name,
            dimensions,
            model: Arc::new(OnceCell::new()),
        }
    }

    /// Resolve a model by name and check it produces `dimensions`-long vectors.
    pub fn from_model_str(name: &str, dimensions: usize) -> Result<Self, MemoryError> {
        let (model_name, model_dimensions) = match name {
            "all-MiniLM-L6-v2" => (EmbeddingModel::AllMiniLML6V2, 384),
            "all-MiniLM-L12-v2" => (EmbeddingModel::AllMiniLML12V2, 384),
            "bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, 384),
            "bge-base-en-v1.5" => (EmbeddingModel::BGEBaseENV15, 768),
            "nomic-embed-text-v1.5" => (EmbeddingModel::NomicEmbedTextV15, 768),
            other => {
                return Err(MemoryError::Embedding(format!(
                    "unknown local embedding model: {other}"
                )));
            }
        };
        if model_dimensions != dimensions {
            return Err(MemoryError::Embedding(format!(
                "model {name} produces {model_dimensions}-dim vectors, configured {dimensions}"
            )));
        }
        Ok(Self::new(model_name, dimensions))
    }

    pub fn model_name(&self) -> &EmbeddingModel {
        &self.model_name
    }
}

impl Default for FastEmbedder {
    fn default() -> Self {
        Self::new(EmbeddingModel::AllMiniLML6V2, 384)
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let cell = self.model.clone();
        let model_name = self.model_name.clone();
        let texts = texts.to_vec();
        let vectors = tokio::task::spawn_blocking(move || {
            let model = cell.get_or_try_init(|| {
                info!("loading local embedding model (model={model_name:?})");
                TextEmbedding::try_new(
                    InitOptions::new(model_name.clone()).with_show_download_progress(false),
                )
                .map_err(|err| MemoryError::Embedding(format!("model init: {err}")))
            })?;
            model
                .embed(texts, None)
                .map_err(|err| MemoryError::Embedding(err.to_string()))
        })
        .await??;
        debug!(
            "local embeddings computed (inputs={}, dims={})",
            vectors.len(),
            self.dimensions
        );
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Offline embedder based on signed feature hashing.
///
/// Word tokens and their character trigrams are hashed into `dimensions`
/// buckets and the result is L2-normalised, so cosine similarity tracks
/// lexical overlap between texts rather than meaning. Useful without network
/// access and in tests.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

/// Weight of a whole-word feature relative to a trigram feature.
const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Embed a single text synchronously.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        for word in lowered
            .split(|ch: char| !ch.is_alphanumeric())
            .filter(|word| !word.is_empty())
        {
            self.add_feature(&mut vector, word, WORD_WEIGHT);
            let padded: Vec<char> = format!("#{word}#").chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, &trigram, TRIGRAM_WEIGHT);
            }
        }
        normalize(&mut vector);
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        let hash = hasher.finish();
        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|value| *value /= norm);
    }
}

/// Cosine similarity of two vectors; 0.0 when either is zero or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct HttpEmbedder {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dimensions: usize,
    http_client: reqwest::Client,
}

impl HttpEmbedder {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        dimensions: usize,
    ) -> Result<Self, MemoryError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| MemoryError::Embedding(format!("http client: {err}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            dimensions,
            http_client,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(
            "requesting embeddings (model={}, inputs={})",
            self.model,
            texts.len()
        );
        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };
        let mut request = self.http_client.post(&self.endpoint).json(&body);
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|err| MemoryError::Embedding(format!("request failed: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::Embedding(format!(
                "embedding API error {status}: {body}"
            )));
        }
        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|err| MemoryError::Embedding(format!("invalid response: {err}")))?;
        if parsed.data.len() != texts.len() {
            return Err(MemoryError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }
        parsed.data.sort_by_key(|datum| datum.index);
        Ok(parsed.data.into_iter().map(|datum| datum.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

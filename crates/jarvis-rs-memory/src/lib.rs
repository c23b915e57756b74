//! Long-term semantic memory for Jarvis.
//!
//! Answers are stored as records keyed by a hash of the prompt that produced
//! them and recalled by embedding similarity.

pub mod embedding;
pub mod error;
pub mod model;
pub mod provider;

/// Embedding providers.
pub use embedding::{
    DEFAULT_LOCAL_MODEL, Embedder, FastEmbedder, HashingEmbedder, HttpEmbedder, cosine_similarity,
};
/// Memory error type.
pub use error::MemoryError;
/// Memory record model.
pub use model::{MemoryRecord, record_id};
/// Memory provider interface and default vector store.
pub use provider::{MemoryMatch, MemoryProvider, VectorMemoryProvider};

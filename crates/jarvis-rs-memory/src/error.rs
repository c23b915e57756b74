//! Error types for memory operations.

/// Errors returned by memory providers and embedders.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The embedding backend failed or returned an unusable payload.
    #[error("embedding error: {0}")]
    Embedding(String),
    /// A blocking worker panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

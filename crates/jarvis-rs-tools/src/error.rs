//! Error types for web search providers.

use thiserror::Error;

/// Errors surfaced by a `WebProvider`.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request could not be sent or timed out.
    #[error("search request failed: {0}")]
    Request(String),
    /// The provider answered with a non-success status.
    #[error("search provider returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The provider body could not be decoded.
    #[error("invalid search response: {0}")]
    Decode(String),
}

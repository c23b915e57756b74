//! Web provider interface.

use crate::SearchError;
use async_trait::async_trait;
use jarvis_rs_protocol::SearchSnippet;

/// Source of ranked web snippets.
#[async_trait]
pub trait WebProvider: Send + Sync {
    /// Return at most `limit` snippets for `query`, best first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchSnippet>, SearchError>;
}

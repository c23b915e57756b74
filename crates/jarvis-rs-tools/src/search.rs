//! Search client that turns provider results into context text.

use crate::WebProvider;
use jarvis_rs_protocol::{NO_WEB_RESULTS, StepOutcome};
use log::{debug, warn};
use std::sync::Arc;

/// Formats web results for the generation context.
///
/// Provider errors never escape: they degrade to the no-results sentinel.
#[derive(Clone)]
pub struct SearchClient {
    provider: Arc<dyn WebProvider>,
}

impl SearchClient {
    pub fn new(provider: Arc<dyn WebProvider>) -> Self {
        Self { provider }
    }

    /// Search and render up to `max_results` lines of `"<title>: <body>"`.
    pub async fn search(&self, query: &str, max_results: usize) -> StepOutcome<String> {
        match self.provider.search(query, max_results).await {
            Ok(snippets) if snippets.is_empty() => {
                debug!("web search returned no results (query_len={})", query.len());
                StepOutcome::Ok(NO_WEB_RESULTS.to_string())
            }
            Ok(snippets) => {
                let lines: Vec<String> = snippets
                    .iter()
                    .take(max_results)
                    .map(|snippet| snippet.render())
                    .collect();
                debug!(
                    "web search complete (query_len={}, results={})",
                    query.len(),
                    lines.len()
                );
                StepOutcome::Ok(lines.join("\n"))
            }
            Err(err) => {
                warn!("web search failed (err={err})");
                StepOutcome::degraded(NO_WEB_RESULTS.to_string(), err)
            }
        }
    }
}

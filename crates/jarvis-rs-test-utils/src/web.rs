use async_trait::async_trait;
use jarvis_rs_protocol::SearchSnippet;
use jarvis_rs_tools::{SearchError, WebProvider};
use parking_lot::Mutex;

/// Web provider returning canned snippets and recording queries.
#[derive(Debug, Default)]
pub struct StubWebProvider {
    results: Vec<SearchSnippet>,
    fail: bool,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StubWebProvider {
    pub fn new(results: Vec<SearchSnippet>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl WebProvider for StubWebProvider {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchSnippet>, SearchError> {
        self.queries.lock().push((query.to_string(), limit));
        if self.fail {
            return Err(SearchError::Request("stub provider offline".to_string()));
        }
        Ok(self.results.iter().take(limit).cloned().collect())
    }
}

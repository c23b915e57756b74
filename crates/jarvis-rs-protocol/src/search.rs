//! Search snippet model.

use serde::{Deserialize, Serialize};

/// Text returned by the search client when nothing usable came back.
pub const NO_WEB_RESULTS: &str = "No web results found.";

/// A single ranked web search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchSnippet {
    /// Result title.
    pub title: String,
    /// Short result body.
    pub body: String,
}

impl SearchSnippet {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Render as a single `"<title>: <body>"` line.
    pub fn render(&self) -> String {
        format!("{}: {}", self.title, self.body)
    }
}

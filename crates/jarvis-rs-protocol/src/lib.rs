//! Wire types shared by the Jarvis server, client, and core pipeline.

mod outcome;
mod search;

pub use outcome::StepOutcome;
pub use search::{NO_WEB_RESULTS, SearchSnippet};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error message returned when a request carries no usable prompt.
pub const MISSING_PROMPT: &str = "Missing prompt.";
/// Static liveness message served from the root route.
pub const ROOT_MESSAGE: &str = "Jarvis AI Agent running";

/// Body of an ask request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskRequest {
    /// Raw user prompt. A missing field is treated as empty.
    #[serde(default)]
    pub prompt: String,
}

impl AskRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Successful answer to an ask request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskResponse {
    /// Final answer text.
    pub response: String,
    /// Whether the answer was served from the response cache.
    pub cached: bool,
    /// Recalled memory context, at most one entry.
    #[serde(default)]
    pub related_memories: Vec<String>,
    /// Wall-clock time spent on the request, e.g. `"1.25s"`.
    pub processing_time: String,
}

/// Status query payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    /// Number of stored memory records (0 when the store is unreachable).
    pub memory_items: usize,
}

impl HealthResponse {
    pub fn healthy(memory_items: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            memory_items,
        }
    }
}

/// Root liveness payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootResponse {
    pub message: String,
}

impl Default for RootResponse {
    fn default() -> Self {
        Self {
            message: ROOT_MESSAGE.to_string(),
        }
    }
}

/// Error payload for non-success responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Format an elapsed duration as seconds with two decimals (`"0.42s"`).
pub fn format_processing_time(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

//! Error types for the core pipeline.

use thiserror::Error;

/// Failure of a single generation call.
///
/// The display texts are what clients see when generation fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The backend answered with a non-success status.
    #[error("Error from OpenRouter: {body}")]
    Backend { status: u16, body: String },
    /// The backend answered but the body had no usable completion.
    #[error("Error parsing response.")]
    Malformed(String),
    /// The request never produced a response.
    #[error("Error contacting generation backend: {0}")]
    Transport(String),
}

/// Errors returned by orchestrator operations.
#[derive(Debug, Error)]
pub enum JarvisCoreError {
    /// The prompt was empty after trimming.
    #[error("Missing prompt.")]
    EmptyPrompt,
    /// Generation failed and the pipeline was stopped.
    #[error("{0}")]
    Generation(#[from] GenerationError),
    /// The orchestrator could not be assembled.
    #[error("config error: {0}")]
    Config(String),
}

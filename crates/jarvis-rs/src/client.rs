//! HTTP client for a running Jarvis server.

use jarvis_rs_protocol::{AskRequest, AskResponse, ErrorResponse, HealthResponse};
use log::debug;
use thiserror::Error;

/// Errors returned by `JarvisClient`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Prompt was blank; nothing was sent.
    #[error("prompt cannot be empty")]
    EmptyPrompt,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with an error payload.
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
}

/// Thin client over the HTTP surface.
#[derive(Debug, Clone)]
pub struct JarvisClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl JarvisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a prompt. Blank prompts are refused without a request.
    pub async fn ask(&self, prompt: &str) -> Result<AskResponse, ClientError> {
        if prompt.trim().is_empty() {
            return Err(ClientError::EmptyPrompt);
        }
        debug!("client ask (prompt_len={})", prompt.len());
        let response = self
            .http_client
            .post(format!("{}/ask", self.base_url))
            .json(&AskRequest::new(prompt))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|err| err.error)
                .unwrap_or(body);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .http_client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

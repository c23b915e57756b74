//! Text generation backends.

use crate::error::GenerationError;
use async_trait::async_trait;
use jarvis_rs_config::GeneratorConfig;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Produces an answer for a prompt given retrieved context.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, context: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Chat-completions client for OpenRouter (or any compatible endpoint).
pub struct OpenRouterGenerator {
    endpoint: String,
    model: String,
    api_key: String,
    referer: String,
    title: String,
    system_prompt: String,
    http_client: reqwest::Client,
}

impl OpenRouterGenerator {
    pub fn new(config: &GeneratorConfig, api_key: impl Into<String>) -> Result<Self, GenerationError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|err| GenerationError::Transport(err.to_string()))?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: api_key.into(),
            referer: config.referer.clone(),
            title: config.title.clone(),
            system_prompt: config.system_prompt.clone(),
            http_client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, prompt: &str, context: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: self.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_turn(prompt, context),
                },
            ],
        }
    }
}

/// User message carrying the context block followed by the prompt.
pub(crate) fn user_turn(prompt: &str, context: &str) -> String {
    format!("{context}\n\nUser: {prompt}")
}

#[async_trait]
impl Generator for OpenRouterGenerator {
    async fn generate(&self, prompt: &str, context: &str) -> Result<String, GenerationError> {
        debug!(
            "generation request (model={}, prompt_len={}, context_len={})",
            self.model,
            prompt.len(),
            context.len()
        );
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&self.build_request(prompt, context))
            .send()
            .await
            .map_err(|err| GenerationError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| GenerationError::Transport(err.to_string()))?;
        if !status.is_success() {
            error!(
                "generation backend error (status={}, body_len={})",
                status.as_u16(),
                body.len()
            );
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|err| {
            error!("generation response parse failed (err={err})");
            GenerationError::Malformed(err.to_string())
        })?;
        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            error!("generation response had no choices");
            GenerationError::Malformed("no choices in response".to_string())
        })?;
        Ok(choice.message.content.trim().to_string())
    }
}

//! Orchestrator: runs one prompt through cache, recall, search, generation,
//! reflection and persistence.

mod builder;

pub use builder::OrchestratorBuilder;

use crate::cache::ResponseCache;
use crate::error::JarvisCoreError;
use crate::generator::Generator;
use crate::memory::{MemoryStore, preview};
use crate::reflection::Reflector;
use jarvis_rs_config::GenerationFailureMode;
use jarvis_rs_protocol::{AskResponse, StepOutcome, format_processing_time};
use jarvis_rs_tools::{SearchClient, TriggerPolicy};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Names of the steps that may report a degraded outcome.
pub mod steps {
    pub const MEMORY_RECALL: &str = "memory_recall";
    pub const WEB_SEARCH: &str = "web_search";
    pub const GENERATION: &str = "generation";
    pub const REFLECTION: &str = "reflection";
    pub const MEMORY_SAVE: &str = "memory_save";
}

/// Label placed before web results in the generation context.
const WEB_RESULTS_LABEL: &str = "[ Web Search Results]";

/// Result of a single `ask`.
#[derive(Debug, Clone, PartialEq)]
pub struct AskReply {
    pub response: String,
    pub cached: bool,
    /// Memory context used for generation; at most one entry.
    pub related_memories: Vec<String>,
    pub elapsed: Duration,
    /// Steps that fell back during this request.
    pub degraded: Vec<&'static str>,
}

impl AskReply {
    /// Wire form returned by the HTTP surface.
    pub fn into_response(self) -> AskResponse {
        AskResponse {
            response: self.response,
            cached: self.cached,
            related_memories: self.related_memories,
            processing_time: format_processing_time(self.elapsed),
        }
    }
}

/// Web search wiring: the client plus when and how to call it.
#[derive(Clone)]
pub(crate) struct SearchStage {
    pub(crate) client: SearchClient,
    pub(crate) triggers: TriggerPolicy,
    pub(crate) max_results: usize,
}

/// Request handler sequencing every collaborator for one prompt.
pub struct Orchestrator {
    cache: Arc<ResponseCache>,
    memory: MemoryStore,
    search: Option<SearchStage>,
    generator: Arc<dyn Generator>,
    reflector: Reflector,
    on_failure: GenerationFailureMode,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Stored memory count for health reporting; 0 when unreachable.
    pub async fn memory_count(&self) -> usize {
        self.memory.count().await
    }

    /// Answer a prompt.
    ///
    /// The prompt is trimmed first; the trimmed text is the cache key and the
    /// memory id source. Only an empty prompt or, in `Reject` mode, a
    /// generation failure produce an error.
    pub async fn ask(&self, prompt: &str) -> Result<AskReply, JarvisCoreError> {
        let started = Instant::now();
        let prompt = prompt.trim();
        if prompt.is_empty() {
            debug!("rejecting empty prompt");
            return Err(JarvisCoreError::EmptyPrompt);
        }

        if let Some(response) = self.cache.get(prompt) {
            info!(
                "cache hit (prompt_len={}, prompt_preview={:?})",
                prompt.len(),
                preview(prompt)
            );
            return Ok(AskReply {
                response,
                cached: true,
                related_memories: Vec::new(),
                elapsed: started.elapsed(),
                degraded: Vec::new(),
            });
        }

        info!(
            "processing prompt (prompt_len={}, prompt_preview={:?})",
            prompt.len(),
            preview(prompt)
        );
        let mut degraded = Vec::new();

        let memory_context = track(
            self.memory.retrieve(prompt).await,
            steps::MEMORY_RECALL,
            &mut degraded,
        );
        let mut context = memory_context.clone();

        if let Some(search) = self.search.as_ref().filter(|s| s.triggers.matches(prompt)) {
            let query = search.triggers.derive_query(prompt);
            info!(
                "web search triggered (words={:?}, query_len={})",
                search.triggers.matched_words(prompt),
                query.len()
            );
            let web = track(
                search.client.search(&query, search.max_results).await,
                steps::WEB_SEARCH,
                &mut degraded,
            );
            context.push_str(&format!("\n\n{WEB_RESULTS_LABEL}\n{web}"));
        }

        let initial = match self.generator.generate(prompt, &context).await {
            Ok(answer) => answer,
            Err(err) => match self.on_failure {
                GenerationFailureMode::Reject => {
                    error!("generation failed; request rejected (err={err})");
                    return Err(JarvisCoreError::Generation(err));
                }
                GenerationFailureMode::Answer => {
                    warn!("generation failed; answering with error text (err={err})");
                    degraded.push(steps::GENERATION);
                    err.to_string()
                }
            },
        };

        let response = track(
            self.reflector.reflect(prompt, &initial).await,
            steps::REFLECTION,
            &mut degraded,
        );

        track(
            self.memory.save(prompt, &response).await,
            steps::MEMORY_SAVE,
            &mut degraded,
        );
        self.cache.put(prompt, &response);

        let elapsed = started.elapsed();
        info!(
            "prompt answered (elapsed_ms={}, response_len={}, degraded={:?})",
            elapsed.as_millis(),
            response.len(),
            degraded
        );
        Ok(AskReply {
            response,
            cached: false,
            related_memories: if memory_context.is_empty() {
                Vec::new()
            } else {
                vec![memory_context]
            },
            elapsed,
            degraded,
        })
    }
}

/// Unwrap a step outcome, recording the step when it degraded.
fn track<T>(outcome: StepOutcome<T>, step: &'static str, degraded: &mut Vec<&'static str>) -> T {
    if outcome.is_degraded() {
        degraded.push(step);
    }
    outcome.into_value()
}

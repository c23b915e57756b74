//! Self-review pass over a generated answer.

use crate::generator::Generator;
use jarvis_rs_config::{ReflectionConfig, ReflectionPolicyKind};
use jarvis_rs_protocol::StepOutcome;
use log::{debug, warn};
use std::sync::Arc;

/// When the reflection pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReflectionPolicy {
    #[default]
    Always,
    Never,
    /// Only answers with at least this many characters are reflected.
    LongAnswers { min_answer_chars: usize },
}

impl ReflectionPolicy {
    pub fn from_config(config: &ReflectionConfig) -> Self {
        match config.policy {
            ReflectionPolicyKind::Always => Self::Always,
            ReflectionPolicyKind::Never => Self::Never,
            ReflectionPolicyKind::LongAnswers => Self::LongAnswers {
                min_answer_chars: config.min_answer_chars,
            },
        }
    }

    pub fn should_reflect(&self, answer: &str) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::LongAnswers { min_answer_chars } => answer.chars().count() >= *min_answer_chars,
        }
    }
}

/// Build the critique prompt sent to the generator.
pub fn critique_prompt(prompt: &str, initial: &str) -> String {
    format!(
        "\nAnalyze and improve this response for clarity, accuracy, and completeness.\n\
         User Query: {prompt}\n\
         Previous Response: {initial}\n\
         Improved Version:\n"
    )
}

/// Runs at most one critique-and-revise generation per answer.
#[derive(Clone)]
pub struct Reflector {
    generator: Arc<dyn Generator>,
    policy: ReflectionPolicy,
}

impl Reflector {
    pub fn new(generator: Arc<dyn Generator>, policy: ReflectionPolicy) -> Self {
        Self { generator, policy }
    }

    pub fn policy(&self) -> ReflectionPolicy {
        self.policy
    }

    /// Improve `initial`, falling back to it when the pass is skipped, returns
    /// nothing, or fails.
    pub async fn reflect(&self, prompt: &str, initial: &str) -> StepOutcome<String> {
        if !self.policy.should_reflect(initial) {
            debug!(
                "reflection skipped (policy={:?}, answer_len={})",
                self.policy,
                initial.len()
            );
            return StepOutcome::Ok(initial.to_string());
        }
        match self
            .generator
            .generate(&critique_prompt(prompt, initial), "")
            .await
        {
            Ok(improved) if improved.trim().is_empty() => {
                debug!("reflection returned empty output; keeping initial answer");
                StepOutcome::Ok(initial.to_string())
            }
            Ok(improved) => StepOutcome::Ok(improved),
            Err(err) => {
                warn!("reflection failed (err={err})");
                StepOutcome::degraded(initial.to_string(), err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ReflectionPolicy, Reflector, critique_prompt};
    use crate::error::GenerationError;
    use crate::generator::Generator;
    use async_trait::async_trait;
    use jarvis_rs_config::{ReflectionConfig, ReflectionPolicyKind};
    use jarvis_rs_protocol::StepOutcome;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct Canned {
        reply: Result<String, GenerationError>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl Canned {
        fn new(reply: Result<String, GenerationError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Generator for Canned {
        async fn generate(&self, prompt: &str, context: &str) -> Result<String, GenerationError> {
            self.prompts
                .lock()
                .push((prompt.to_string(), context.to_string()));
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn always_policy_sends_critique_with_empty_context() {
        let generator = Canned::new(Ok("better".to_string()));
        let reflector = Reflector::new(generator.clone(), ReflectionPolicy::Always);
        let outcome = reflector.reflect("Why?", "because").await;
        assert_eq!(outcome, StepOutcome::Ok("better".to_string()));
        let prompts = generator.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, critique_prompt("Why?", "because"));
        assert_eq!(prompts[0].1, "");
    }

    #[tokio::test]
    async fn empty_output_keeps_initial_answer() {
        let reflector = Reflector::new(Canned::new(Ok("  ".to_string())), ReflectionPolicy::Always);
        assert_eq!(
            reflector.reflect("q", "initial").await,
            StepOutcome::Ok("initial".to_string())
        );
    }

    #[tokio::test]
    async fn never_policy_makes_no_generator_calls() {
        let generator = Canned::new(Ok("unused".to_string()));
        let reflector = Reflector::new(generator.clone(), ReflectionPolicy::Never);
        assert_eq!(
            reflector.reflect("q", "initial").await,
            StepOutcome::Ok("initial".to_string())
        );
        assert!(generator.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn generator_failure_degrades_to_initial() {
        let reflector = Reflector::new(
            Canned::new(Err(GenerationError::Malformed("eof".to_string()))),
            ReflectionPolicy::Always,
        );
        let outcome = reflector.reflect("q", "initial").await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.value(), "initial");
        assert_eq!(outcome.reason(), Some("Error parsing response."));
    }

    #[test]
    fn long_answer_policy_counts_characters() {
        let policy = ReflectionPolicy::from_config(&ReflectionConfig {
            policy: ReflectionPolicyKind::LongAnswers,
            min_answer_chars: 5,
        });
        assert!(!policy.should_reflect("abcd"));
        assert!(policy.should_reflect("ébcde"));
    }

    #[test]
    fn critique_prompt_embeds_query_and_answer() {
        let prompt = critique_prompt("What is 2+2?", "4");
        assert!(prompt.contains("User Query: What is 2+2?\n"));
        assert!(prompt.contains("Previous Response: 4\n"));
        assert!(prompt.trim_end().ends_with("Improved Version:"));
    }
}

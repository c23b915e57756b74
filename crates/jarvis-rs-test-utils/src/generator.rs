use async_trait::async_trait;
use jarvis_rs_core::{GenerationError, Generator};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Arguments of one recorded `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationCall {
    pub prompt: String,
    pub context: String,
}

impl GenerationCall {
    fn new(prompt: &str, context: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            context: context.to_string(),
        }
    }
}

/// Always answers with the same text.
#[derive(Debug, Default)]
pub struct FixedGenerator {
    reply: String,
    calls: Mutex<Vec<GenerationCall>>,
}

impl FixedGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Generator for FixedGenerator {
    async fn generate(&self, prompt: &str, context: &str) -> Result<String, GenerationError> {
        self.calls.lock().push(GenerationCall::new(prompt, context));
        Ok(self.reply.clone())
    }
}

/// Replays queued replies in order; the last reply repeats once the queue
/// runs dry.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    last: Mutex<Option<Result<String, GenerationError>>>,
    calls: Mutex<Vec<GenerationCall>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(replies.into_iter().map(|reply| Ok(reply.into())))
    }

    pub fn with_results(replies: impl IntoIterator<Item = Result<String, GenerationError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            last: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, context: &str) -> Result<String, GenerationError> {
        self.calls.lock().push(GenerationCall::new(prompt, context));
        let next = self.replies.lock().pop_front();
        let mut last = self.last.lock();
        if let Some(reply) = next {
            *last = Some(reply);
        }
        last.clone().unwrap_or_else(|| Ok(String::new()))
    }
}

/// Fails every call with the configured error.
#[derive(Debug)]
pub struct FailingGenerator {
    error: GenerationError,
    calls: Mutex<Vec<GenerationCall>>,
}

impl FailingGenerator {
    pub fn new(error: GenerationError) -> Self {
        Self {
            error,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Backend failure with the given status and body.
    pub fn backend(status: u16, body: impl Into<String>) -> Self {
        Self::new(GenerationError::Backend {
            status,
            body: body.into(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, prompt: &str, context: &str) -> Result<String, GenerationError> {
        self.calls.lock().push(GenerationCall::new(prompt, context));
        Err(self.error.clone())
    }
}

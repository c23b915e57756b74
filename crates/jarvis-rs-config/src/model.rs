//! Configuration schema for Jarvis.

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Root config for the Jarvis service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JarvisConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub reflection: ReflectionConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl JarvisConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> JarvisConfigBuilder {
        JarvisConfigBuilder::new()
    }
}

/// Builder for assembling a `JarvisConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct JarvisConfigBuilder {
    config: JarvisConfig,
}

impl JarvisConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: JarvisConfig::default(),
        }
    }

    /// Replace the generation backend configuration.
    pub fn generator(mut self, generator: GeneratorConfig) -> Self {
        self.config.generator = generator;
        self
    }

    /// Replace the response cache configuration.
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    /// Replace the long-term memory configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the web search configuration.
    pub fn search(mut self, search: SearchConfig) -> Self {
        self.config.search = search;
        self
    }

    /// Replace the reflection configuration.
    pub fn reflection(mut self, reflection: ReflectionConfig) -> Self {
        self.config.reflection = reflection;
        self
    }

    /// Replace the HTTP server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Finalize and return the built `JarvisConfig`.
    pub fn build(self) -> JarvisConfig {
        self.config
    }
}

/// Secrets resolved once at startup and handed to the pipeline.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub generator: String,
    pub embedding: Option<String>,
}

impl Credentials {
    pub fn new(generator: impl Into<String>) -> Self {
        Self {
            generator: generator.into(),
            embedding: None,
        }
    }
}

impl JarvisConfig {
    /// Resolve every credential the config names through `lookup`.
    ///
    /// The generation key is required; the embedding key is optional.
    pub fn resolve_credentials<F>(&self, lookup: F) -> Result<Credentials, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Credentials {
            generator: self.generator.resolve_api_key(&lookup)?,
            embedding: self.memory.embedding.resolve_api_key(&lookup),
        })
    }
}

/// How a generation backend failure is surfaced to the pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationFailureMode {
    /// Stop the request and return an error to the caller.
    #[default]
    Reject,
    /// Use the error text as the answer and continue the pipeline.
    Answer,
}

/// Generation backend (chat completions) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_generator_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_generator_model")]
    pub model: String,
    /// Name of the environment variable holding the backend credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub on_failure: GenerationFailureMode,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_generator_endpoint(),
            model: default_generator_model(),
            api_key_env: default_api_key_env(),
            referer: default_referer(),
            title: default_title(),
            system_prompt: default_system_prompt(),
            timeout_secs: None,
            on_failure: GenerationFailureMode::default(),
        }
    }
}

impl GeneratorConfig {
    /// Resolve the backend credential through `lookup` (normally the process env).
    ///
    /// A missing or blank value is a fatal startup condition for the server.
    pub fn resolve_api_key<F>(&self, lookup: F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(&self.api_key_env) {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ConfigError::MissingCredential(self.api_key_env.clone())),
        }
    }
}

fn default_generator_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_generator_model() -> String {
    "mistralai/mixtral-8x7b-instruct".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_referer() -> String {
    "http://localhost:8000".to_string()
}

fn default_title() -> String {
    "Jarvis AI Agent".to_string()
}

fn default_system_prompt() -> String {
    "You are Jarvis, a precise, reflective AI assistant that fuses web knowledge, \
     past memories, and logic to deliver accurate, well-structured answers."
        .to_string()
}

/// Response cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_cache_capacity() -> usize {
    200
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

/// Long-term memory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Number of memories recalled per request.
    #[serde(default = "default_recall_k")]
    pub recall_k: usize,
    /// Optional JSONL file used to persist records across restarts.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            recall_k: default_recall_k(),
            path: None,
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// Default number of memory items to recall.
fn default_recall_k() -> usize {
    3
}

/// Embedding backend selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderKind {
    /// Local sentence-transformer model (`local_model`) run through fastembed.
    #[default]
    #[serde(rename = "fastembed")]
    FastEmbed,
    /// Offline feature-hashing embedder; lexical overlap only.
    Hashing,
    /// OpenAI-compatible embeddings endpoint.
    Http,
}

/// Embedding configuration used by the memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderKind,
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
    /// Model name for the `fastembed` provider.
    #[serde(default = "default_local_model")]
    pub local_model: String,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_api_key_env")]
    pub api_key_env: String,
}

impl EmbeddingConfig {
    /// Optional credential for the `http` provider; blank values count as unset.
    pub fn resolve_api_key<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(&self.api_key_env)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            dimensions: default_embedding_dimensions(),
            local_model: default_local_model(),
            endpoint: default_embedding_endpoint(),
            model: default_embedding_model(),
            api_key_env: default_embedding_api_key_env(),
        }
    }
}

fn default_embedding_dimensions() -> usize {
    384
}

fn default_local_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_embedding_endpoint() -> String {
    "https://api.openai.com/v1/embeddings".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Web search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_search_max_results")]
    pub max_results: usize,
    /// Words that trigger a web search when present in a prompt.
    #[serde(default = "default_trigger_words")]
    pub trigger_words: Vec<String>,
    /// Literal substrings removed (first occurrence each) to derive the query.
    #[serde(default = "default_strip_words")]
    pub strip_words: Vec<String>,
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_results: default_search_max_results(),
            trigger_words: default_trigger_words(),
            strip_words: default_strip_words(),
            endpoint: default_search_endpoint(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_search_max_results() -> usize {
    5
}

fn default_trigger_words() -> Vec<String> {
    ["search", "find", "latest", "news", "update"]
        .iter()
        .map(|word| word.to_string())
        .collect()
}

fn default_strip_words() -> Vec<String> {
    vec!["search".to_string(), "find".to_string()]
}

fn default_search_endpoint() -> String {
    "https://api.duckduckgo.com/".to_string()
}

fn default_search_timeout_secs() -> u64 {
    10
}

/// When the reflection pass runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionPolicyKind {
    #[default]
    Always,
    Never,
    /// Reflect only answers of at least `min_answer_chars` characters.
    LongAnswers,
}

/// Reflection pass configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionConfig {
    #[serde(default)]
    pub policy: ReflectionPolicyKind,
    #[serde(default = "default_min_answer_chars")]
    pub min_answer_chars: usize,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            policy: ReflectionPolicyKind::default(),
            min_answer_chars: default_min_answer_chars(),
        }
    }
}

fn default_min_answer_chars() -> usize {
    280
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

//! Assembly of an `Orchestrator` from parts or from config.

use super::{Orchestrator, SearchStage};
use crate::cache::ResponseCache;
use crate::error::JarvisCoreError;
use crate::generator::{Generator, OpenRouterGenerator};
use crate::memory::MemoryStore;
use crate::reflection::{ReflectionPolicy, Reflector};
use jarvis_rs_config::{
    Credentials, EmbeddingConfig, EmbeddingProviderKind, GenerationFailureMode, JarvisConfig,
};
use jarvis_rs_memory::{
    Embedder, FastEmbedder, HashingEmbedder, HttpEmbedder, MemoryProvider, VectorMemoryProvider,
};
use jarvis_rs_tools::{DuckDuckGoProvider, SearchClient, TriggerPolicy, WebProvider};
use log::info;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_RECALL_K: usize = 3;
const DEFAULT_MAX_SEARCH_RESULTS: usize = 5;
const DEFAULT_CACHE_CAPACITY: usize = 200;
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Builder injecting every collaborator of the orchestrator.
///
/// A generator is required. Memory defaults to an in-process vector store over
/// the local MiniLM embedder and the cache to 200 entries for one hour. A web provider is required unless
/// search is disabled.
pub struct OrchestratorBuilder {
    cache: Option<Arc<ResponseCache>>,
    memory: Option<Arc<dyn MemoryProvider>>,
    web: Option<Arc<dyn WebProvider>>,
    generator: Option<Arc<dyn Generator>>,
    reflection: ReflectionPolicy,
    triggers: TriggerPolicy,
    recall_k: usize,
    max_search_results: usize,
    search_enabled: bool,
    on_failure: GenerationFailureMode,
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            cache: None,
            memory: None,
            web: None,
            generator: None,
            reflection: ReflectionPolicy::default(),
            triggers: TriggerPolicy::default(),
            recall_k: DEFAULT_RECALL_K,
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            search_enabled: true,
            on_failure: GenerationFailureMode::default(),
        }
    }

    pub fn cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn memory(mut self, memory: Arc<dyn MemoryProvider>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn web(mut self, web: Arc<dyn WebProvider>) -> Self {
        self.web = Some(web);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn reflection(mut self, policy: ReflectionPolicy) -> Self {
        self.reflection = policy;
        self
    }

    pub fn triggers(mut self, triggers: TriggerPolicy) -> Self {
        self.triggers = triggers;
        self
    }

    pub fn recall_k(mut self, recall_k: usize) -> Self {
        self.recall_k = recall_k;
        self
    }

    pub fn max_search_results(mut self, max_results: usize) -> Self {
        self.max_search_results = max_results;
        self
    }

    pub fn search_enabled(mut self, enabled: bool) -> Self {
        self.search_enabled = enabled;
        self
    }

    pub fn on_failure(mut self, mode: GenerationFailureMode) -> Self {
        self.on_failure = mode;
        self
    }

    pub fn build(self) -> Result<Orchestrator, JarvisCoreError> {
        let generator = self
            .generator
            .ok_or_else(|| JarvisCoreError::Config("generator not configured".to_string()))?;
        let search = if self.search_enabled {
            let web = self.web.ok_or_else(|| {
                JarvisCoreError::Config("web provider not configured".to_string())
            })?;
            Some(SearchStage {
                client: SearchClient::new(web),
                triggers: self.triggers,
                max_results: self.max_search_results,
            })
        } else {
            None
        };
        let memory = self.memory.unwrap_or_else(|| {
            Arc::new(VectorMemoryProvider::in_memory(Arc::new(
                FastEmbedder::default(),
            )))
        });
        let cache = self.cache.unwrap_or_else(|| {
            Arc::new(ResponseCache::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL))
        });

        Ok(Orchestrator {
            cache,
            memory: MemoryStore::new(memory, self.recall_k),
            search,
            reflector: Reflector::new(generator.clone(), self.reflection),
            generator,
            on_failure: self.on_failure,
        })
    }
}

/// Embedder selected by `memory.embedding`.
pub(crate) fn embedder_from_config(
    config: &EmbeddingConfig,
    api_key: Option<String>,
) -> Result<Arc<dyn Embedder>, JarvisCoreError> {
    let embedder: Arc<dyn Embedder> = match config.provider {
        EmbeddingProviderKind::FastEmbed => Arc::new(
            FastEmbedder::from_model_str(&config.local_model, config.dimensions)
                .map_err(|err| JarvisCoreError::Config(err.to_string()))?,
        ),
        EmbeddingProviderKind::Hashing => Arc::new(HashingEmbedder::new(config.dimensions)),
        EmbeddingProviderKind::Http => Arc::new(
            HttpEmbedder::new(
                config.endpoint.clone(),
                config.model.clone(),
                api_key,
                config.dimensions,
            )
            .map_err(|err| JarvisCoreError::Config(err.to_string()))?,
        ),
    };
    Ok(embedder)
}

impl Orchestrator {
    /// Build the production pipeline from config.
    ///
    /// Credentials are resolved by the caller, normally through
    /// `JarvisConfig::resolve_credentials`.
    pub async fn from_config(
        config: &JarvisConfig,
        credentials: &Credentials,
    ) -> Result<Self, JarvisCoreError> {
        let generator = OpenRouterGenerator::new(&config.generator, credentials.generator.clone())
            .map_err(|err| JarvisCoreError::Config(err.to_string()))?;

        let embedder =
            embedder_from_config(&config.memory.embedding, credentials.embedding.clone())?;
        let memory: Arc<dyn MemoryProvider> = match config.memory.path.as_deref() {
            Some(path) => Arc::new(
                VectorMemoryProvider::open(path, embedder)
                    .await
                    .map_err(|err| JarvisCoreError::Config(format!("memory store: {err}")))?,
            ),
            None => Arc::new(VectorMemoryProvider::in_memory(embedder)),
        };

        let mut builder = OrchestratorBuilder::new()
            .cache(Arc::new(ResponseCache::from_config(&config.cache)))
            .memory(memory)
            .generator(Arc::new(generator))
            .reflection(ReflectionPolicy::from_config(&config.reflection))
            .triggers(TriggerPolicy::from_config(&config.search))
            .recall_k(config.memory.recall_k)
            .max_search_results(config.search.max_results)
            .search_enabled(config.search.enabled)
            .on_failure(config.generator.on_failure);
        if config.search.enabled {
            let web = DuckDuckGoProvider::from_config(&config.search)
                .map_err(|err| JarvisCoreError::Config(err.to_string()))?;
            builder = builder.web(Arc::new(web));
        }

        info!(
            "orchestrator configured (model={}, search_enabled={}, reflection={:?}, embedding={:?}, memory_path={:?})",
            config.generator.model,
            config.search.enabled,
            config.reflection.policy,
            config.memory.embedding.provider,
            config.memory.path
        );
        builder.build()
    }
}

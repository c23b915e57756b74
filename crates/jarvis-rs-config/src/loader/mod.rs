//! Layered configuration loader.
//!
//! Discovers the user and working-directory layers, validates each against the
//! schema, merges them with any runtime overrides, and produces a final
//! `JarvisConfig`.

mod layer_io;
mod merge;
mod schema;


use crate::{ConfigError, JarvisConfig, ReflectionPolicyKind};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "jarvis.json5";
/// Default config directory under the user's home.
const DEFAULT_CONFIG_DIR: &str = ".jarvis";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: JarvisConfig,
    /// Metadata for each layer that contributed to the config.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// User-specific configuration.
    User,
    /// Current working directory configuration.
    Cwd,
    /// Runtime overrides (highest precedence).
    Runtime,
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory searched for `jarvis.json5`.
    pub cwd: PathBuf,
    /// Optional user config path (defaults to `~/.jarvis/jarvis.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override config paths applied last.
    pub runtime_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
        }
    }

    /// Override the user config location.
    pub fn with_user_path(mut self, path: Option<PathBuf>) -> Self {
        self.user_config_path = path;
        self
    }

    /// Add a runtime override config path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl JarvisConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack using explicit layer locations.
    ///
    /// Layer precedence (low -> high): user, cwd, runtime overrides.
    /// Missing user and cwd files are skipped; runtime paths must exist.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());
        let mut seen_paths = HashSet::new();

        let mut candidates = Vec::new();
        if let Some(path) = options.user_config_path.as_ref() {
            candidates.push((ConfigLayerSource::User, path.clone(), false));
        }
        candidates.push((
            ConfigLayerSource::Cwd,
            options.cwd.join(DEFAULT_CONFIG_FILE),
            false,
        ));
        for path in &options.runtime_paths {
            candidates.push((ConfigLayerSource::Runtime, path.clone(), true));
        }

        for (source, path, required) in candidates {
            if !required && !path.exists() {
                debug!(
                    "skipping missing layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            let unique = path.canonicalize().unwrap_or_else(|_| path.clone());
            if !seen_paths.insert(unique) {
                debug!(
                    "skipping duplicate layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            let value = layer_io::load_layer(source, &path)?;
            merge::merge_json_values(&mut merged, &value);
            layers.push(ConfigLayer { source, path });
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache.capacity must be at least 1".to_string(),
            ));
        }
        if self.memory.recall_k == 0 {
            return Err(ConfigError::Invalid(
                "memory.recall_k must be at least 1".to_string(),
            ));
        }
        if self.search.max_results == 0 {
            return Err(ConfigError::Invalid(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        if self.memory.embedding.dimensions == 0 {
            return Err(ConfigError::Invalid(
                "memory.embedding.dimensions must be at least 1".to_string(),
            ));
        }
        if self.generator.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "generator.endpoint must not be empty".to_string(),
            ));
        }
        if self.search.enabled && self.search.trigger_words.is_empty() {
            return Err(ConfigError::Invalid(
                "search.trigger_words must not be empty when search is enabled".to_string(),
            ));
        }
        if self.reflection.policy == ReflectionPolicyKind::LongAnswers
            && self.reflection.min_answer_chars == 0
        {
            return Err(ConfigError::Invalid(
                "reflection.min_answer_chars must be positive for long_answers".to_string(),
            ));
        }
        Ok(())
    }
}

fn config_from_value(value: Value, label: &str) -> Result<JarvisConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: JarvisConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}

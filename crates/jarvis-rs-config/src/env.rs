//! Environment variable overrides applied on top of loaded config.

use crate::{ConfigError, JarvisConfig};
use log::debug;

pub const ENV_MODEL: &str = "JARVIS_MODEL";
pub const ENV_GENERATOR_ENDPOINT: &str = "JARVIS_GENERATOR_ENDPOINT";
pub const ENV_BIND: &str = "JARVIS_BIND";
pub const ENV_MEMORY_PATH: &str = "JARVIS_MEMORY_PATH";
pub const ENV_CACHE_TTL_SECS: &str = "JARVIS_CACHE_TTL_SECS";
pub const ENV_CACHE_CAPACITY: &str = "JARVIS_CACHE_CAPACITY";

impl JarvisConfig {
    /// Apply `JARVIS_*` overrides resolved through `lookup`.
    ///
    /// Blank values are ignored. Numeric overrides that fail to parse are
    /// reported as `InvalidField` errors naming the variable.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(model) = read(ENV_MODEL) {
            debug!("config override from env (var={ENV_MODEL})");
            self.generator.model = model;
        }
        if let Some(endpoint) = read(ENV_GENERATOR_ENDPOINT) {
            debug!("config override from env (var={ENV_GENERATOR_ENDPOINT})");
            self.generator.endpoint = endpoint;
        }
        if let Some(bind) = read(ENV_BIND) {
            debug!("config override from env (var={ENV_BIND})");
            self.server.bind = bind;
        }
        if let Some(path) = read(ENV_MEMORY_PATH) {
            debug!("config override from env (var={ENV_MEMORY_PATH})");
            self.memory.path = Some(path);
        }
        if let Some(raw) = read(ENV_CACHE_TTL_SECS) {
            self.cache.ttl_secs = parse_number(ENV_CACHE_TTL_SECS, &raw)?;
        }
        if let Some(raw) = read(ENV_CACHE_CAPACITY) {
            self.cache.capacity = parse_number(ENV_CACHE_CAPACITY, &raw)?;
        }
        self.validate()
    }

    /// Apply overrides from the current process environment.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|name| std::env::var(name).ok())
    }
}

fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidField {
        path: format!("env:{var}"),
        message: format!("expected non-negative integer, got {raw:?}"),
    })
}

#[cfg(test)]
mod tests {
    use crate::{ConfigError, JarvisConfig};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn env_overrides_replace_values() {
        let mut config = JarvisConfig::default();
        config
            .apply_env(lookup(&[
                ("JARVIS_MODEL", "meta/llama"),
                ("JARVIS_BIND", "0.0.0.0:8080"),
                ("JARVIS_MEMORY_PATH", "/var/lib/jarvis/memory.jsonl"),
                ("JARVIS_CACHE_TTL_SECS", "120"),
                ("JARVIS_CACHE_CAPACITY", "16"),
            ]))
            .expect("apply");
        assert_eq!(config.generator.model, "meta/llama");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(
            config.memory.path.as_deref(),
            Some("/var/lib/jarvis/memory.jsonl")
        );
        assert_eq!(config.cache.ttl_secs, 120);
        assert_eq!(config.cache.capacity, 16);
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = JarvisConfig::default();
        config
            .apply_env(lookup(&[("JARVIS_MODEL", "  ")]))
            .expect("apply");
        assert_eq!(config.generator.model, "mistralai/mixtral-8x7b-instruct");
    }

    #[test]
    fn invalid_numeric_override_names_variable() {
        let mut config = JarvisConfig::default();
        let err = config
            .apply_env(lookup(&[("JARVIS_CACHE_TTL_SECS", "soon")]))
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidField { ref path, .. } if path == "env:JARVIS_CACHE_TTL_SECS")
        );
    }

    #[test]
    fn zero_capacity_override_fails_validation() {
        let mut config = JarvisConfig::default();
        let err = config
            .apply_env(lookup(&[("JARVIS_CACHE_CAPACITY", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}

//! Schema validation helpers for Jarvis JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    let allowed = [
        "$schema",
        "generator",
        "cache",
        "memory",
        "search",
        "reflection",
        "server",
    ];
    ensure_allowed_keys(map, &allowed, layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("generator") {
        validate_generator(value, layer, "generator")?;
    }
    if let Some(value) = map.get("cache") {
        validate_cache(value, layer, "cache")?;
    }
    if let Some(value) = map.get("memory") {
        validate_memory(value, layer, "memory")?;
    }
    if let Some(value) = map.get("search") {
        validate_search(value, layer, "search")?;
    }
    if let Some(value) = map.get("reflection") {
        validate_reflection(value, layer, "reflection")?;
    }
    if let Some(value) = map.get("server") {
        let map = expect_object(value, layer, "server")?;
        ensure_allowed_keys(map, &["bind"], layer, "server")?;
        if let Some(value) = map.get("bind") {
            expect_string(value, layer, "server.bind")?;
        }
    }

    Ok(())
}

/// Validate the "generator" block.
fn validate_generator(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let strings = [
        "endpoint",
        "model",
        "api_key_env",
        "referer",
        "title",
        "system_prompt",
    ];
    let mut allowed = strings.to_vec();
    allowed.extend(["timeout_secs", "on_failure"]);
    ensure_allowed_keys(map, &allowed, layer, path)?;
    for key in strings {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("timeout_secs") {
        if !value.is_null() {
            expect_u64(value, layer, &join_path(path, "timeout_secs"))?;
        }
    }
    if let Some(value) = map.get("on_failure") {
        expect_enum(
            value,
            &["reject", "answer"],
            layer,
            &join_path(path, "on_failure"),
        )?;
    }
    Ok(())
}

/// Validate the "cache" block.
fn validate_cache(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["capacity", "ttl_secs"], layer, path)?;
    for key in ["capacity", "ttl_secs"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate the "memory" block and its embedding settings.
fn validate_memory(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["recall_k", "path", "embedding"], layer, path)?;
    if let Some(value) = map.get("recall_k") {
        expect_u64(value, layer, &join_path(path, "recall_k"))?;
    }
    if let Some(value) = map.get("path") {
        if !value.is_null() {
            expect_string(value, layer, &join_path(path, "path"))?;
        }
    }
    if let Some(value) = map.get("embedding") {
        let path = join_path(path, "embedding");
        let map = expect_object(value, layer, &path)?;
        ensure_allowed_keys(
            map,
            &[
                "provider",
                "dimensions",
                "local_model",
                "endpoint",
                "model",
                "api_key_env",
            ],
            layer,
            &path,
        )?;
        if let Some(value) = map.get("provider") {
            expect_enum(
                value,
                &["fastembed", "hashing", "http"],
                layer,
                &join_path(&path, "provider"),
            )?;
        }
        if let Some(value) = map.get("dimensions") {
            expect_u64(value, layer, &join_path(&path, "dimensions"))?;
        }
        for key in ["local_model", "endpoint", "model", "api_key_env"] {
            if let Some(value) = map.get(key) {
                expect_string(value, layer, &join_path(&path, key))?;
            }
        }
    }
    Ok(())
}

/// Validate the "search" block.
fn validate_search(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "enabled",
            "max_results",
            "trigger_words",
            "strip_words",
            "endpoint",
            "timeout_secs",
        ],
        layer,
        path,
    )?;
    if let Some(value) = map.get("enabled") {
        expect_bool(value, layer, &join_path(path, "enabled"))?;
    }
    for key in ["max_results", "timeout_secs"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    for key in ["trigger_words", "strip_words"] {
        if let Some(value) = map.get(key) {
            validate_string_array(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("endpoint") {
        expect_string(value, layer, &join_path(path, "endpoint"))?;
    }
    Ok(())
}

/// Validate the "reflection" block.
fn validate_reflection(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["policy", "min_answer_chars"], layer, path)?;
    if let Some(value) = map.get("policy") {
        expect_enum(
            value,
            &["always", "never", "long_answers"],
            layer,
            &join_path(path, "policy"),
        )?;
    }
    if let Some(value) = map.get("min_answer_chars") {
        expect_u64(value, layer, &join_path(path, "min_answer_chars"))?;
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_string() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

fn expect_bool(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_boolean() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected bool"))
    }
}

/// Expect a non-negative JSON integer.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Expect a string drawn from a fixed set of variants.
fn expect_enum(
    value: &Value,
    variants: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match value.as_str() {
        Some(raw) if variants.contains(&raw) => Ok(()),
        _ => Err(invalid_field(
            layer,
            path,
            &format!("expected one of: {}", variants.join(", ")),
        )),
    }
}

/// Validate that a value is an array of strings.
fn validate_string_array(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let Value::Array(arr) = value else {
        return Err(invalid_field(layer, path, "expected array"));
    };
    for (idx, entry) in arr.iter().enumerate() {
        if !entry.is_string() {
            return Err(invalid_field(
                layer,
                &format!("{path}[{idx}]"),
                "expected string",
            ));
        }
    }
    Ok(())
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{path}"),
        message: message.to_string(),
    }
}

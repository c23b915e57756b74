//! Config-driven assembly against a local chat-completions stub.

use axum::routing::post;
use axum::{Json, Router};
use jarvis_rs_config::{Credentials, EmbeddingProviderKind, JarvisConfig, ReflectionPolicyKind};
use jarvis_rs_core::{JarvisCoreError, Orchestrator};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;

async fn spawn_backend(calls: Arc<AtomicUsize>) -> String {
    let router = Router::new().route(
        "/chat",
        post(move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Json(json!({"choices": [{"message": {"content": "stub answer"}}]}))
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}/chat")
}

fn offline_config(endpoint: String, memory_path: &Path) -> JarvisConfig {
    let mut config = JarvisConfig::default();
    config.generator.endpoint = endpoint;
    config.generator.timeout_secs = Some(5);
    config.cache.capacity = 7;
    config.memory.path = Some(memory_path.display().to_string());
    config.memory.embedding.provider = EmbeddingProviderKind::Hashing;
    config.search.enabled = false;
    config.reflection.policy = ReflectionPolicyKind::Never;
    config
}

#[tokio::test]
async fn config_maps_onto_the_pipeline() {
    let calls = Arc::new(AtomicUsize::new(0));
    let endpoint = spawn_backend(calls.clone()).await;
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("state").join("memory.jsonl");
    let config = offline_config(endpoint, &path);

    let orchestrator = Orchestrator::from_config(&config, &Credentials::new("sk-test"))
        .await
        .expect("orchestrator");
    assert_eq!(orchestrator.cache().capacity(), 7);
    assert_eq!(orchestrator.memory_count().await, 0);

    let reply = orchestrator.ask("find latest news").await.expect("ask");
    assert_eq!(reply.response, "stub answer");
    assert!(reply.degraded.is_empty(), "{:?}", reply.degraded);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(orchestrator.memory_count().await, 1);
    let contents = std::fs::read_to_string(&path).expect("read");
    assert_eq!(contents.lines().count(), 1);

    let reopened = Orchestrator::from_config(&config, &Credentials::new("sk-test"))
        .await
        .expect("reopen");
    assert_eq!(reopened.memory_count().await, 1);
}

#[tokio::test]
async fn unknown_local_model_is_a_config_error() {
    let temp = tempdir().expect("tempdir");
    let mut config = offline_config(
        "http://127.0.0.1:9/chat".to_string(),
        &temp.path().join("memory.jsonl"),
    );
    config.memory.embedding.provider = EmbeddingProviderKind::FastEmbed;
    config.memory.embedding.local_model = "word2vec".to_string();

    let err = Orchestrator::from_config(&config, &Credentials::new("sk-test"))
        .await
        .err()
        .expect("config error");
    assert!(matches!(err, JarvisCoreError::Config(ref message) if message.contains("word2vec")));
}

#[tokio::test]
async fn local_model_dimensions_must_match() {
    let mut config = JarvisConfig::default();
    config.search.enabled = false;
    config.memory.embedding.dimensions = 512;

    let err = Orchestrator::from_config(&config, &Credentials::new("sk-test"))
        .await
        .err()
        .expect("config error");
    assert!(err.to_string().contains("512"), "{err}");
}

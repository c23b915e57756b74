use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use jarvis_rs_memory::{Embedder, HttpEmbedder, MemoryError};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

async fn spawn_embeddings_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}/v1/embeddings")
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[tokio::test]
async fn results_are_reordered_by_index() {
    let router = Router::new().route(
        "/v1/embeddings",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(
                headers.get("authorization").and_then(|v| v.to_str().ok()),
                Some("Bearer sk-embed")
            );
            assert_eq!(body["model"], "text-embedding-3-small");
            assert_eq!(body["input"], json!(["first", "second"]));
            Json(json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]}
                ]
            }))
        }),
    );
    let endpoint = spawn_embeddings_server(router).await;
    let embedder = HttpEmbedder::new(
        endpoint,
        "text-embedding-3-small",
        Some("sk-embed".to_string()),
        2,
    )
    .expect("embedder");

    let vectors = embedder
        .embed(&texts(&["first", "second"]))
        .await
        .expect("embed");
    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    assert_eq!(embedder.dimensions(), 2);
}

#[tokio::test]
async fn count_mismatch_is_an_error() {
    let router = Router::new().route(
        "/v1/embeddings",
        post(|| async { Json(json!({"data": [{"index": 0, "embedding": [1.0]}]})) }),
    );
    let endpoint = spawn_embeddings_server(router).await;
    let embedder = HttpEmbedder::new(endpoint, "m", None, 1).expect("embedder");

    let err = embedder.embed(&texts(&["a", "b"])).await.unwrap_err();
    match err {
        MemoryError::Embedding(message) => assert!(message.contains("expected 2"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn error_status_carries_body() {
    let router = Router::new().route(
        "/v1/embeddings",
        post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
    );
    let endpoint = spawn_embeddings_server(router).await;
    let embedder = HttpEmbedder::new(endpoint, "m", None, 1).expect("embedder");

    let err = embedder.embed(&texts(&["a"])).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("401"), "{message}");
    assert!(message.contains("invalid api key"), "{message}");
}

#[tokio::test]
async fn empty_batch_makes_no_request() {
    let embedder =
        HttpEmbedder::new("http://127.0.0.1:9/v1/embeddings", "m", None, 1).expect("embedder");
    let vectors = embedder.embed(&[]).await.expect("embed");
    assert!(vectors.is_empty());
}

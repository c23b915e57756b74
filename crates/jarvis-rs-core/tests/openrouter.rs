//! OpenRouter client tests against a local chat-completions stub.

use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Json;
use jarvis_rs_config::GeneratorConfig;
use jarvis_rs_core::{GenerationError, Generator, OpenRouterGenerator};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}/api/v1/chat/completions")
}

fn generator(endpoint: String) -> OpenRouterGenerator {
    let config = GeneratorConfig {
        endpoint,
        timeout_secs: Some(5),
        ..GeneratorConfig::default()
    };
    OpenRouterGenerator::new(&config, "sk-test").expect("generator")
}

#[tokio::test]
async fn sends_headers_and_returns_trimmed_content() {
    let router = Router::new().route(
        "/api/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let header = |name: &str| {
                headers
                    .get(name)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            };
            if header("authorization") != "Bearer sk-test"
                || header("http-referer") != "http://localhost:8000"
                || header("x-title") != "Jarvis AI Agent"
            {
                return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad headers"})));
            }
            let user = body["messages"][1]["content"].as_str().unwrap_or_default();
            (
                StatusCode::OK,
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": format!("  echo: {user}  ")}}]
                })),
            )
        }),
    );
    let endpoint = spawn(router).await;

    let answer = generator(endpoint)
        .generate("Hi", "ctx")
        .await
        .expect("generate");
    assert_eq!(answer, "echo: ctx\n\nUser: Hi");
}

#[tokio::test]
async fn non_success_status_becomes_backend_error() {
    let router = Router::new().route(
        "/api/v1/chat/completions",
        post(|| async { (StatusCode::PAYMENT_REQUIRED, "insufficient credits") }),
    );
    let endpoint = spawn(router).await;

    let err = generator(endpoint).generate("Hi", "").await.unwrap_err();
    assert_eq!(
        err,
        GenerationError::Backend {
            status: 402,
            body: "insufficient credits".to_string()
        }
    );
    assert_eq!(err.to_string(), "Error from OpenRouter: insufficient credits");
}

#[tokio::test]
async fn malformed_body_becomes_parse_error() {
    let router = Router::new().route(
        "/api/v1/chat/completions",
        post(|| async { Json(json!({"choices": []})) }),
    );
    let endpoint = spawn(router).await;

    let err = generator(endpoint).generate("Hi", "").await.unwrap_err();
    assert!(matches!(err, GenerationError::Malformed(_)));
    assert_eq!(err.to_string(), "Error parsing response.");
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = generator(format!("http://{addr}/"))
        .generate("Hi", "")
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Transport(_)));
}

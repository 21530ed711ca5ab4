//! Integration tests for GeminiService against an in-process axum server
//! that imitates the `generateContent` endpoint.

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use reviewgen_service::{GeminiService, GenerativeService, ServiceError, ServiceRequest};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const TEST_KEY: &str = "test-key";

async fn generate_content(
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(TEST_KEY) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}})),
        );
    }
    let Some(model) = call.strip_suffix(":generateContent") else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": {"message": "bad call"}})));
    };
    if model == "broken-model" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!("not the usual shape")));
    }
    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": format!("###REVIEW### {model} ###END###\n")},
                        {"text": format!("###REVIEW### echo: {prompt} ###END###")}
                    ]
                }
            }]
        })),
    )
}

/// Start the fake API on an ephemeral port, return its base URL.
async fn spawn_fake_gemini() -> String {
    let app = Router::new().route("/v1beta/models/{call}", post(generate_content));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn generate_returns_joined_text() {
    let base = spawn_fake_gemini().await;
    let svc = GeminiService::with_api_key(&base, TEST_KEY.into());
    let text = svc
        .generate(&ServiceRequest::new("hello", "gemini-pro"))
        .await
        .unwrap();
    assert_eq!(
        text,
        "###REVIEW### gemini-pro ###END###\n###REVIEW### echo: hello ###END###"
    );
}

#[tokio::test]
async fn wrong_key_maps_to_service_error() {
    let base = spawn_fake_gemini().await;
    let svc = GeminiService::with_api_key(&base, "wrong".into());
    let err = svc
        .generate(&ServiceRequest::new("hello", "gemini-pro"))
        .await
        .unwrap_err();
    match err {
        ServiceError::Service { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "API key not valid");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unstructured_error_body_is_kept() {
    let base = spawn_fake_gemini().await;
    let svc = GeminiService::with_api_key(&base, TEST_KEY.into());
    let err = svc
        .generate(&ServiceRequest::new("hello", "broken-model"))
        .await
        .unwrap_err();
    match err {
        ServiceError::Service { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("not the usual shape"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let svc = GeminiService::with_api_key(&format!("http://{addr}"), TEST_KEY.into());
    let err = svc
        .generate(&ServiceRequest::new("hello", "gemini-pro"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Transport(_)));
}

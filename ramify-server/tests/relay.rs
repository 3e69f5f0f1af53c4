//! End-to-end tests for the relay routes, driven through the router with
//! stubbed provider and agent endpoints.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode, header};
use httpmock::prelude::*;
use ramify_core::{
    AgentClient, AgentConfig, ArtifactStore, DeepseekClient, GenerationConfig, StorageConfig,
};
use ramify_server::routes::create_router;
use ramify_server::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Relay router wired to stub endpoints on `provider`.
fn test_app(provider: &MockServer, store: Option<ArtifactStore>) -> Router {
    let generator =
        DeepseekClient::new(GenerationConfig::new("test-key", provider.base_url())).unwrap();
    let agent = AgentClient::new(AgentConfig::new(provider.url("/agent"))).unwrap();
    create_router(AppState::new(generator, agent, store))
}

/// Stub completion payload with a single choice.
fn completion(content: &str) -> Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes)
}

async fn post_raw(app: Router, path: &str, body: Value) -> (StatusCode, Bytes) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
    let (status, bytes) = post_raw(app, path, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_json(app: Router, path: &str) -> (StatusCode, Value) {
    let (status, bytes) = send(
        app,
        Request::builder().uri(path).body(Body::empty()).unwrap(),
    )
    .await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_mindmap_relays_provider_text() {
    let provider = MockServer::start();
    let mock = provider.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .header("authorization", "Bearer test-key")
            .body_contains("人工智能");
        then.status(200).json_body(completion("#A,\n##a1,\n##a2"));
    });

    let app = test_app(&provider, None);
    let (status, body) =
        post_json(app, "/api/generate-mindmap", json!({"topic": "人工智能"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], json!("#A,\n##a1,\n##a2"));
    assert_eq!(body["topic"], json!("人工智能"));
    mock.assert();
}

#[tokio::test]
async fn test_mindmap_exact_envelope() {
    let provider = MockServer::start();
    provider.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(completion("#A,\n##a1,\n##a2"));
    });

    let app = test_app(&provider, None);
    let (status, bytes) =
        post_raw(app, "/api/generate-mindmap", json!({"topic": "人工智能"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        std::str::from_utf8(&bytes).unwrap(),
        "{\"success\":true,\"data\":\"#A,\\n##a1,\\n##a2\",\"topic\":\"人工智能\"}"
    );
}

#[tokio::test]
async fn test_missing_topic_rejected_before_provider_call() {
    let provider = MockServer::start();
    let mock = provider.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(completion("unused"));
    });

    let app = test_app(&provider, None);
    let (status, body) = post_json(app, "/api/generate-mindmap", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("missing required parameter"));
    assert_eq!(body["message"], json!("topic is required"));
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn test_blank_topic_rejected() {
    let provider = MockServer::start();
    let app = test_app(&provider, None);

    let (status, body) = post_json(app, "/api/generate-mindmap", json!({"topic": "   "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("topic is required"));
}

#[tokio::test]
async fn test_malformed_json_gets_error_envelope() {
    let provider = MockServer::start();
    let app = test_app(&provider, None);

    let (status, bytes) = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/generate-mindmap")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;

    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_provider_failure_maps_to_500_envelope() {
    let provider = MockServer::start();
    provider.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(500).body("model overloaded");
    });

    let app = test_app(&provider, None);
    let (status, body) = post_json(app, "/api/generate-mindmap", json!({"topic": "tea"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("internal server error"));
    let message = body["message"].as_str().unwrap();
    assert!(!message.is_empty());
    assert!(message.contains("model overloaded"));
}

#[tokio::test]
async fn test_identical_requests_yield_identical_envelopes() {
    let provider = MockServer::start();
    provider.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(completion("#T,\n##t1,"));
    });

    let app = test_app(&provider, None);
    let (_, first) =
        post_raw(app.clone(), "/api/generate-mindmap", json!({"topic": "tea"})).await;
    let (_, second) = post_raw(app, "/api/generate-mindmap", json!({"topic": "tea"})).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_business_reshapes_nested_agent_payload() {
    let provider = MockServer::start();
    let mock = provider.mock(|when, then| {
        when.method(POST)
            .path("/agent")
            .json_body(json!({"query": "市场分析"}));
        then.status(200).json_body(json!({
            "response": {"body": {"choices": [{"message": {"content": "X"}}]}}
        }));
    });

    let app = test_app(&provider, None);
    let (status, body) =
        post_json(app, "/api/generate-business", json!({"query": "市场分析"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["type"], json!("text"));
    assert_eq!(body["data"]["result"], json!("X"));
    assert!(!body["timestamp"].as_str().unwrap().is_empty());
    mock.assert();
}

#[tokio::test]
async fn test_business_falls_back_to_text_field() {
    let provider = MockServer::start();
    provider.mock(|when, then| {
        when.method(POST).path("/agent");
        then.status(200).json_body(json!({"text": "plain answer"}));
    });

    let app = test_app(&provider, None);
    let (status, body) =
        post_json(app, "/api/generate-business", json!({"query": "stores"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], json!("plain answer"));
}

#[tokio::test]
async fn test_business_rejects_malformed_agent_payload() {
    let provider = MockServer::start();
    provider.mock(|when, then| {
        when.method(POST).path("/agent");
        then.status(200).json_body(json!({"unexpected": true}));
    });

    let app = test_app(&provider, None);
    let (status, body) =
        post_json(app, "/api/generate-business", json!({"query": "stores"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("internal server error"));
}

#[tokio::test]
async fn test_missing_query_rejected_before_agent_call() {
    let provider = MockServer::start();
    let mock = provider.mock(|when, then| {
        when.method(POST).path("/agent");
        then.status(200).json_body(json!({"text": "unused"}));
    });

    let app = test_app(&provider, None);
    let (status, body) = post_json(app, "/api/generate-business", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("query is required"));
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn test_business_responses_differ_only_in_timestamp() {
    let provider = MockServer::start();
    provider.mock(|when, then| {
        when.method(POST).path("/agent");
        then.status(200).json_body(json!({"text": "stable"}));
    });

    let app = test_app(&provider, None);
    let (_, mut first) =
        post_json(app.clone(), "/api/generate-business", json!({"query": "q"})).await;
    let (_, mut second) = post_json(app, "/api/generate-business", json!({"query": "q"})).await;

    assert!(first["timestamp"].as_str().is_some());
    first.as_object_mut().unwrap().remove("timestamp");
    second.as_object_mut().unwrap().remove("timestamp");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_route_gets_error_envelope() {
    let provider = MockServer::start();
    let app = test_app(&provider, None);

    let (status, body) = get_json(app, "/api/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("not found"));
}

#[tokio::test]
async fn test_wrong_method_gets_error_envelope() {
    let provider = MockServer::start();
    let app = test_app(&provider, None);

    let (status, body) = get_json(app, "/api/generate-mindmap").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("method not allowed"));
}

#[tokio::test]
async fn test_preflight_gets_permissive_cors() {
    let provider = MockServer::start();
    let app = test_app(&provider, None);

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/generate-mindmap")
                .header(header::ORIGIN, "https://example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_health_endpoint_reports_healthy() {
    let provider = MockServer::start();
    let app = test_app(&provider, None);

    let (status, body) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_version_endpoint_reports_build_metadata() {
    let provider = MockServer::start();
    let app = test_app(&provider, None);

    let (status, body) = get_json(app, "/api/version").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
    assert!(body["git_hash"].as_str().is_some());
    assert!(body["build_time"].as_str().is_some());
}

#[tokio::test]
async fn test_mindmap_persists_outline_when_store_configured() {
    let provider = MockServer::start();
    provider.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(completion("#T,\n##t1,"));
    });

    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(StorageConfig {
        output_dir: Some(dir.path().to_path_buf()),
        bucket: None,
        region: "us-east-1".to_string(),
        endpoint: None,
    })
    .await;

    let app = test_app(&provider, Some(store));
    let (status, body) = post_json(app, "/api/generate-mindmap", json!({"topic": "tea"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!("#T,\n##t1,"));

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(entries.len(), 1);
    let name = entries[0].file_name().to_string_lossy().into_owned();
    assert!(name.starts_with("mindmap_tea_"));
    assert!(name.ends_with(".txt"));
    let written = std::fs::read_to_string(entries[0].path()).unwrap();
    assert_eq!(written, "#T,\n##t1,");
}

#[tokio::test]
async fn test_persistence_failure_does_not_fail_response() {
    let provider = MockServer::start();
    provider.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(completion("#T,\n##t1,"));
    });

    // Point the output dir at a regular file so the local write fails.
    let dir = tempfile::tempdir().unwrap();
    let occupied = dir.path().join("occupied");
    std::fs::write(&occupied, "x").unwrap();

    let store = ArtifactStore::new(StorageConfig {
        output_dir: Some(occupied),
        bucket: None,
        region: "us-east-1".to_string(),
        endpoint: None,
    })
    .await;

    let app = test_app(&provider, Some(store));
    let (status, body) = post_json(app, "/api/generate-mindmap", json!({"topic": "tea"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], json!("#T,\n##t1,"));
}

// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use tower::ServiceExt;

use teamdesk_core::AiErrorKind;
use teamdesk_relay::{RelayState, router};
use teamdesk_test_utils::MockResponder;

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("origin", "http://localhost:5173")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn success_returns_content() {
    let responder = MockResponder::with_replies(vec!["Sure, I can help."]);
    let app = router(RelayState::new(Arc::new(responder.clone())));

    let response = app
        .oneshot(post("/generate-ai-response", r#"{"message":"hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    assert_eq!(json(response).await["content"], "Sure, I can help.");
    assert_eq!(responder.prompts().await, vec!["hi"]);
}

#[tokio::test]
async fn root_path_is_an_alias() {
    let app = router(RelayState::new(Arc::new(MockResponder::new())));
    let response = app.oneshot(post("/", r#"{"message":"hi"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["content"], "mock response");
}

#[tokio::test]
async fn missing_or_empty_message_is_bad_request() {
    for body in [r#"{}"#, r#"{"message":""}"#, r#"{"message":42}"#] {
        let responder = MockResponder::new();
        let app = router(RelayState::new(Arc::new(responder.clone())));
        let response = app.oneshot(post("/generate-ai-response", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(json(response).await["error"], "Message is required");
        assert_eq!(responder.calls().await, 0);
    }
}

#[tokio::test]
async fn responder_failure_is_server_error() {
    let app = router(RelayState::new(Arc::new(MockResponder::failing(
        AiErrorKind::Upstream,
    ))));
    let response = app
        .oneshot(post("/generate-ai-response", r#"{"message":"hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json(response).await;
    assert!(body["error"].as_str().unwrap().contains("upstream_error"));
}

#[tokio::test]
async fn malformed_json_is_server_error() {
    let app = router(RelayState::new(Arc::new(MockResponder::new())));
    let response = app
        .oneshot(post("/generate-ai-response", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json(response).await["error"].is_string());
}

#[tokio::test]
async fn preflight_is_answered_with_cors_headers() {
    let app = router(RelayState::new(Arc::new(MockResponder::new())));
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/generate-ai-response")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type,apikey")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    let allowed = headers["access-control-allow-headers"].to_str().unwrap();
    for name in ["authorization", "x-client-info", "apikey", "content-type"] {
        assert!(allowed.contains(name), "missing {name} in {allowed}");
    }
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("OPTIONS"));
}

#[tokio::test]
async fn health_reports_version() {
    let app = router(RelayState::new(Arc::new(MockResponder::new())));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

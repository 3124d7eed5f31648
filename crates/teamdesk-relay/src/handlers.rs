// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers for the relay.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::server::RelayState;

/// Success body.
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: String,
}

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

fn error(status: StatusCode, text: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: text.into() })).into_response()
}

/// POST /generate-ai-response
///
/// The body is parsed by hand so malformed JSON maps to the relay's own
/// 500 `{error}` shape instead of axum's rejection.
pub async fn generate(State(state): State<RelayState>, body: Bytes) -> Response {
    let value: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "relay request body is not JSON");
            return error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let message = match value.get("message").and_then(|m| m.as_str()) {
        Some(m) if !m.is_empty() => m,
        _ => return error(StatusCode::BAD_REQUEST, "Message is required"),
    };

    tracing::debug!(len = message.len(), "relaying prompt");

    match state.responder.respond(message).await {
        Ok(content) => (StatusCode::OK, Json(ContentResponse { content })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, kind = ?e.ai_kind(), "relay responder failed");
            let text = match e {
                teamdesk_core::TeamdeskError::Provider { message, .. } => message,
                other => other.to_string(),
            };
            error(StatusCode::INTERNAL_SERVER_ERROR, text)
        }
    }
}

/// GET /health (unauthenticated).
pub async fn health(State(state): State<RelayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relay HTTP server built on axum.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    http::{HeaderName, Method, header},
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use teamdesk_core::{AiResponder, TeamdeskError};

use crate::handlers;

/// Shared state for relay handlers.
#[derive(Clone)]
pub struct RelayState {
    pub responder: Arc<dyn AiResponder>,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

impl RelayState {
    pub fn new(responder: Arc<dyn AiResponder>) -> Self {
        Self {
            responder,
            start_time: Instant::now(),
        }
    }
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Builds the relay router:
/// - POST /generate-ai-response
/// - POST /
/// - GET /health
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/", post(handlers::generate))
        .route("/generate-ai-response", post(handlers::generate))
        .route("/health", get(handlers::health))
        .layer(cors())
        .with_state(state)
}

/// Binds `host:port` and serves until `cancel` fires.
pub async fn start_server(
    host: &str,
    port: u16,
    state: RelayState,
    cancel: CancellationToken,
) -> Result<(), TeamdeskError> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TeamdeskError::Internal(format!("failed to bind relay to {addr}: {e}")))?;

    tracing::info!(responder = state.responder.name(), "relay listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| TeamdeskError::Internal(format!("relay server error: {e}")))?;

    tracing::info!("relay stopped");
    Ok(())
}

// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the `generateContent` endpoint.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, error};

use teamdesk_core::{AiErrorKind, TeamdeskError};

use crate::types::{ApiErrorResponse, GenerateRequest, GenerateResponse};

/// Default endpoint base.
pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// One-shot, stateless text generation. No retry.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: String, base_url: String) -> Result<Self, TeamdeskError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| TeamdeskError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| TeamdeskError::Provider {
                kind: AiErrorKind::Upstream,
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Sends one prompt and returns the first candidate's text.
    pub async fn generate(&self, prompt: &str) -> Result<String, TeamdeskError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(&GenerateRequest::text(prompt))
            .send()
            .await
            .map_err(|e| TeamdeskError::Provider {
                kind: AiErrorKind::Upstream,
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "generateContent response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "API error {} ({}): {}",
                    api_err.error.code, api_err.error.status, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            error!(status = %status, message = %message, "generateContent failed");
            return Err(TeamdeskError::provider(AiErrorKind::Upstream, message));
        }

        let parsed: GenerateResponse =
            response.json().await.map_err(|e| TeamdeskError::Provider {
                kind: AiErrorKind::Upstream,
                message: format!("failed to parse response: {e}"),
                source: Some(Box::new(e)),
            })?;

        parsed.first_text().map(str::to_string).ok_or_else(|| {
            TeamdeskError::provider(AiErrorKind::EmptyResponse, "No response generated")
        })
    }
}

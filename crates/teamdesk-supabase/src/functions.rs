// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`AiResponder`] that relays prompts through the hosted serverless function.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use teamdesk_core::{
    AdapterType, AiErrorKind, AiResponder, HealthStatus, PluginAdapter, TeamdeskError,
};

use crate::{RestClient, SupabaseSettings};

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct RelayReply {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Sends `{message}` to `{url}/functions/v1/<name>` and reads `{content}` or `{error}`.
#[derive(Debug, Clone)]
pub struct FunctionResponder {
    rest: RestClient,
    url: String,
}

impl FunctionResponder {
    pub fn new(settings: &SupabaseSettings) -> Result<Self, TeamdeskError> {
        let rest = RestClient::new(&settings.url, &settings.anon_key, settings.timeout)?;
        let url = rest.function_url(&settings.ai_function);
        Ok(Self { rest, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PluginAdapter for FunctionResponder {
    fn name(&self) -> &str {
        "relay-function"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Responder
    }

    async fn health_check(&self) -> Result<HealthStatus, TeamdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TeamdeskError> {
        Ok(())
    }
}

#[async_trait]
impl AiResponder for FunctionResponder {
    async fn respond(&self, prompt: &str) -> Result<String, TeamdeskError> {
        let response = self
            .rest
            .post(&self.url)
            .json(&RelayRequest { message: prompt })
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.url, error = %e, "relay request failed");
                TeamdeskError::Provider {
                    kind: AiErrorKind::Upstream,
                    message: format!("relay request failed: {e}"),
                    source: Some(Box::new(e)),
                }
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let reply: RelayReply = serde_json::from_str(&text).unwrap_or_default();
        debug!(status = %status, "relay response received");

        if !status.is_success() {
            let message = reply
                .error
                .unwrap_or_else(|| format!("relay returned {status}: {text}"));
            error!(status = %status, message = %message, "relay reported an error");
            return Err(TeamdeskError::provider(AiErrorKind::Upstream, message));
        }

        match reply.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(TeamdeskError::provider(
                AiErrorKind::EmptyResponse,
                "relay returned no content",
            )),
        }
    }
}

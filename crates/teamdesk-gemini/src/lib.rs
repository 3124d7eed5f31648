// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct generative AI responder for Teamdesk.
//!
//! [`GeminiResponder`] implements [`AiResponder`] against the
//! `generateContent` endpoint and adds persona replies and document reviews.
//! API key resolution: `gemini.api_key` -> `GEMINI_API_KEY` -> `MissingApiKey`
//! at call time.

pub mod client;
pub mod types;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use teamdesk_config::model::GeminiConfig;
use teamdesk_core::{
    AdapterType, AiErrorKind, AiResponder, HealthStatus, PluginAdapter, TeamdeskError,
};

use crate::client::GeminiClient;

/// Result of a document review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReview {
    pub status: String,
    pub feedback: String,
}

/// Generative endpoint responder.
///
/// Constructed even without a key so callers see a classified
/// `MissingApiKey` failure per call rather than a startup error.
pub struct GeminiResponder {
    client: Option<GeminiClient>,
}

impl GeminiResponder {
    pub fn new(config: &GeminiConfig) -> Result<Self, TeamdeskError> {
        let client = match config.resolved_api_key() {
            Some(key) => {
                info!(model = %config.model, "generative responder initialized");
                Some(GeminiClient::new(
                    &key,
                    config.model.clone(),
                    config.base_url.clone(),
                )?)
            }
            None => {
                warn!("no generative API key configured; AI replies will fail");
                None
            }
        };
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: GeminiClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    fn client(&self) -> Result<&GeminiClient, TeamdeskError> {
        self.client.as_ref().ok_or_else(|| {
            TeamdeskError::provider(AiErrorKind::MissingApiKey, "Gemini API key is not configured")
        })
    }

    /// Reply in the voice of a team role.
    pub async fn persona_reply(&self, role: &str, message: &str) -> Result<String, TeamdeskError> {
        self.respond(&persona_prompt(role, message)).await
    }

    /// Ask for review feedback on any serializable document.
    pub async fn review_document<D: Serialize + Sync>(
        &self,
        document: &D,
    ) -> Result<DocumentReview, TeamdeskError> {
        let prompt = review_prompt(document)?;
        let feedback = self.respond(&prompt).await?;
        Ok(DocumentReview {
            status: "success".to_string(),
            feedback,
        })
    }
}

pub fn persona_prompt(role: &str, message: &str) -> String {
    format!(
        "You are {role}. Respond to the following message in a helpful and professional manner: {message}"
    )
}

pub fn review_prompt<D: Serialize>(document: &D) -> Result<String, TeamdeskError> {
    let json = serde_json::to_string(document)
        .map_err(|e| TeamdeskError::Validation(format!("document is not serializable: {e}")))?;
    Ok(format!(
        "You are a document reviewer. Review the following document and provide detailed feedback: {json}"
    ))
}

#[async_trait]
impl PluginAdapter for GeminiResponder {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Responder
    }

    async fn health_check(&self) -> Result<HealthStatus, TeamdeskError> {
        Ok(match &self.client {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Unhealthy("Gemini API key is not configured".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), TeamdeskError> {
        Ok(())
    }
}

#[async_trait]
impl AiResponder for GeminiResponder {
    async fn respond(&self, prompt: &str) -> Result<String, TeamdeskError> {
        self.client()?.generate(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn keyless() -> GeminiResponder {
        GeminiResponder { client: None }
    }

    async fn answering(server: &MockServer, text: &str) -> GeminiResponder {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": text}]}}]
            })))
            .mount(server)
            .await;
        GeminiResponder::with_client(
            GeminiClient::new("k", "gemini-2.0-flash".into(), server.uri()).unwrap(),
        )
    }

    #[tokio::test]
    async fn missing_key_fails_each_call() {
        let responder = keyless();
        let err = responder.respond("hello").await.unwrap_err();
        assert_eq!(err.ai_kind(), Some(AiErrorKind::MissingApiKey));
        assert!(matches!(
            responder.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[test]
    fn persona_prompt_names_role() {
        assert_eq!(
            persona_prompt("QA Tester", "Is the build green?"),
            "You are QA Tester. Respond to the following message in a helpful and professional manner: Is the build green?"
        );
    }

    #[tokio::test]
    async fn persona_reply_sends_wrapped_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("You are Scrum Master."))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Standup at 10."}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let responder = GeminiResponder::with_client(
            GeminiClient::new("k", "gemini-2.0-flash".into(), server.uri()).unwrap(),
        );

        let reply = responder
            .persona_reply("Scrum Master", "When is standup?")
            .await
            .unwrap();
        assert_eq!(reply, "Standup at 10.");
    }

    #[tokio::test]
    async fn review_embeds_serialized_document() {
        let server = MockServer::start().await;
        let responder = answering(&server, "Looks solid.").await;
        let doc = json!({"title": "API Spec", "content": "GET /health"});

        let review = responder.review_document(&doc).await.unwrap();
        assert_eq!(review.status, "success");
        assert_eq!(review.feedback, "Looks solid.");
        assert!(review_prompt(&doc).unwrap().contains("\"title\":\"API Spec\""));
    }
}

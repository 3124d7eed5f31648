// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP core for the hosted store's REST endpoint.
//!
//! Every table call goes through [`RestClient`], which attaches the project
//! key headers and turns non-success responses into `Failed to <operation>`
//! store errors after logging the structured error body.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use teamdesk_core::TeamdeskError;

/// Error body returned by the REST endpoint.
#[derive(Debug, Default, serde::Deserialize)]
pub struct RestErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// Query parameters: PostgREST filters (`column=eq.value`), `order`, `offset`, `limit`.
pub type Query = Vec<(&'static str, String)>;

/// Authenticated client for `{url}/rest/v1/<table>` and `{url}/functions/v1/<name>`.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestClient {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, TeamdeskError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(anon_key)
                .map_err(|e| TeamdeskError::Config(format!("invalid anon key header value: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {anon_key}"))
                .map_err(|e| TeamdeskError::Config(format!("invalid anon key header value: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| TeamdeskError::Store {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// URL of a serverless function.
    pub fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{name}", self.base_url)
    }

    fn table(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/rest/v1/{table}", self.base_url))
    }

    /// `POST` to an arbitrary URL with a JSON body.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url)
    }

    /// `GET` rows matching `query`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
        operation: &str,
    ) -> Result<Vec<T>, TeamdeskError> {
        let req = self.table(Method::GET, table).query(&[("select", "*")]).query(query);
        let rows: Vec<T> = self.send_json(req, operation).await?;
        debug!(table, operation, count = rows.len(), "rows fetched");
        Ok(rows)
    }

    /// `POST` new rows and return them as stored.
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        rows: &B,
        operation: &str,
    ) -> Result<Vec<T>, TeamdeskError> {
        let req = self
            .table(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(rows);
        self.send_json(req, operation).await
    }

    /// `PATCH` rows matching `query` and return them as updated.
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
        patch: &B,
        operation: &str,
    ) -> Result<Vec<T>, TeamdeskError> {
        let req = self
            .table(Method::PATCH, table)
            .query(query)
            .header("Prefer", "return=representation")
            .json(patch);
        self.send_json(req, operation).await
    }

    /// `PATCH` rows matching `query` without reading them back.
    pub async fn update_minimal<B: Serialize + ?Sized>(
        &self,
        table: &str,
        query: &Query,
        patch: &B,
        operation: &str,
    ) -> Result<(), TeamdeskError> {
        let req = self
            .table(Method::PATCH, table)
            .query(query)
            .header("Prefer", "return=minimal")
            .json(patch);
        self.send(req, operation).await.map(drop)
    }

    /// `DELETE` rows matching `query`.
    pub async fn delete(
        &self,
        table: &str,
        query: &Query,
        operation: &str,
    ) -> Result<(), TeamdeskError> {
        let req = self.table(Method::DELETE, table).query(query);
        self.send(req, operation).await.map(drop)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        operation: &str,
    ) -> Result<T, TeamdeskError> {
        let response = self.send(req, operation).await?;
        response.json::<T>().await.map_err(|e| {
            error!(operation, error = %e, "undecodable response from store");
            TeamdeskError::Store {
                message: format!("Failed to {operation}: {e}"),
                source: Some(Box::new(e)),
            }
        })
    }

    async fn send(&self, req: RequestBuilder, operation: &str) -> Result<Response, TeamdeskError> {
        let response = req.send().await.map_err(|e| {
            error!(operation, error = %e, "store request failed");
            TeamdeskError::Store {
                message: format!("Failed to {operation}: {e}"),
                source: Some(Box::new(e)),
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: RestErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = if body.message.is_empty() {
            format!("{status} {text}").trim().to_string()
        } else {
            body.message.clone()
        };
        error!(
            operation,
            status = %status,
            message = %message,
            code = body.code.as_deref().unwrap_or(""),
            details = body.details.as_deref().unwrap_or(""),
            hint = body.hint.as_deref().unwrap_or(""),
            "store error"
        );
        Err(TeamdeskError::store(operation, message))
    }
}

/// `column=eq.value` filter pair.
pub fn eq(column: &'static str, value: impl std::fmt::Display) -> (&'static str, String) {
    (column, format!("eq.{value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RestClient {
        RestClient::new(&server.uri(), "anon-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn select_sends_key_headers_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/team_members"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .and(query_param("select", "*"))
            .and(query_param("role", "eq.QA Tester"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"n": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let rows: Vec<serde_json::Value> = client(&server)
            .select("team_members", &vec![eq("role", "QA Tester")], "fetch team members")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced_with_operation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/documents"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "JWT expired",
                "code": "PGRST301",
                "hint": null
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .select::<serde_json::Value>("documents", &vec![], "fetch documents")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch documents: JWT expired");
    }

    #[tokio::test]
    async fn writes_ask_for_representation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/projects"))
            .and(header("prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([{"id": "p1"}])))
            .mount(&server)
            .await;

        let rows: Vec<serde_json::Value> = client(&server)
            .insert("projects", &serde_json::json!([{"name": "x"}]), "create project")
            .await
            .unwrap();
        assert_eq!(rows[0]["id"], "p1");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client =
            RestClient::new("https://abc.supabase.co/", "k", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.function_url("generate-ai-response"),
            "https://abc.supabase.co/functions/v1/generate-ai-response"
        );
    }
}

// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the Teamdesk workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::access::UserRole;

/// Classification of a failed AI completion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AiErrorKind {
    /// No API key is configured for the generative endpoint.
    MissingApiKey,
    /// The endpoint answered but produced no text.
    EmptyResponse,
    /// Transport failure or non-success status from the endpoint.
    #[strum(serialize = "upstream_error")]
    #[serde(rename = "upstream_error")]
    Upstream,
}

/// The primary error type used across adapter traits and core operations.
#[derive(Debug, Error)]
pub enum TeamdeskError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Local storage errors (cache database, migrations, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Remote store errors. `message` is already phrased for display,
    /// e.g. `Failed to fetch chat messages: permission denied`.
    #[error("{message}")]
    Store {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// AI completion errors.
    #[error("provider error ({kind}): {message}")]
    Provider {
        kind: AiErrorKind,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Realtime channel errors (connect, join, decode).
    #[error("realtime error: {message}")]
    Realtime {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input rejected before any I/O was attempted.
    #[error("validation error: {0}")]
    Validation(String),

    /// Caller lacks the role required for an operation.
    #[error("access denied: requires {required}")]
    AccessDenied { required: UserRole },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TeamdeskError {
    /// Builds a remote store error in the `Failed to <operation>: <detail>` form.
    pub fn store(operation: &str, detail: impl std::fmt::Display) -> Self {
        TeamdeskError::Store {
            message: format!("Failed to {operation}: {detail}"),
            source: None,
        }
    }

    /// Builds a provider error of the given kind.
    pub fn provider(kind: AiErrorKind, message: impl Into<String>) -> Self {
        TeamdeskError::Provider {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Returns the AI failure classification, if this is a provider error.
    pub fn ai_kind(&self) -> Option<AiErrorKind> {
        match self {
            TeamdeskError::Provider { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_error_kinds_render_as_wire_names() {
        assert_eq!(AiErrorKind::MissingApiKey.to_string(), "missing_api_key");
        assert_eq!(AiErrorKind::EmptyResponse.to_string(), "empty_response");
        assert_eq!(AiErrorKind::Upstream.to_string(), "upstream_error");

        let json = serde_json::to_string(&AiErrorKind::Upstream).unwrap();
        assert_eq!(json, "\"upstream_error\"");
    }

    #[test]
    fn store_error_message_names_operation() {
        let err = TeamdeskError::store("fetch chat messages", "permission denied");
        assert_eq!(
            err.to_string(),
            "Failed to fetch chat messages: permission denied"
        );
        assert!(err.ai_kind().is_none());
    }

    #[test]
    fn provider_error_exposes_kind() {
        let err = TeamdeskError::provider(AiErrorKind::EmptyResponse, "no text");
        assert_eq!(err.ai_kind(), Some(AiErrorKind::EmptyResponse));
        assert!(err.to_string().contains("empty_response"));
    }
}

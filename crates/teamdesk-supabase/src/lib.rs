// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted store client for Teamdesk.
//!
//! [`SupabaseStore`] implements the chat, directory, and project traits over
//! the REST endpoint and opens realtime channels for live inserts.
//! [`FunctionResponder`] relays AI prompts through the hosted function.

pub mod chat;
pub mod client;
pub mod directory;
pub mod functions;
pub mod projects;
pub mod realtime;

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use teamdesk_config::model::SupabaseConfig;
use teamdesk_core::{AdapterType, HealthStatus, PluginAdapter, TeamdeskError};

pub use client::RestClient;
pub use functions::FunctionResponder;
pub use realtime::RealtimeSubscription;

/// Resolved connection settings.
#[derive(Debug, Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
    pub ai_function: String,
    pub timeout: Duration,
    pub heartbeat: Duration,
}

impl SupabaseSettings {
    /// Resolve settings from config, falling back to `SUPABASE_URL` and
    /// `SUPABASE_ANON_KEY`.
    pub fn from_config(config: &SupabaseConfig) -> Result<Self, TeamdeskError> {
        let url = config.resolved_url();
        let anon_key = config.resolved_anon_key();
        match (url, anon_key) {
            (Some(url), Some(anon_key)) => Ok(Self {
                url,
                anon_key,
                ai_function: config.ai_function.clone(),
                timeout: Duration::from_secs(config.timeout_secs),
                heartbeat: Duration::from_secs(config.heartbeat_secs),
            }),
            _ => Err(TeamdeskError::Config(
                "Missing Supabase credentials: set supabase.url and supabase.anon_key \
                 (or SUPABASE_URL / SUPABASE_ANON_KEY)"
                    .into(),
            )),
        }
    }
}

/// REST and realtime access to the hosted store.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    rest: RestClient,
    heartbeat: Duration,
}

impl SupabaseStore {
    pub fn new(settings: &SupabaseSettings) -> Result<Self, TeamdeskError> {
        let rest = RestClient::new(&settings.url, &settings.anon_key, settings.timeout)?;
        info!(url = %settings.url, "hosted store client initialized");
        Ok(Self {
            rest,
            heartbeat: settings.heartbeat,
        })
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }
}

#[async_trait]
impl PluginAdapter for SupabaseStore {
    fn name(&self) -> &str {
        "supabase"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, TeamdeskError> {
        let probe = self
            .rest
            .select::<serde_json::Value>(
                "team_members",
                &vec![("limit", "1".to_string())],
                "check store health",
            )
            .await;
        Ok(match probe {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), TeamdeskError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_are_a_config_error() {
        let config = SupabaseConfig {
            url: Some("https://abc.supabase.co".into()),
            anon_key: Some("  ".into()),
            ..Default::default()
        };
        // SAFETY: no other test in this crate reads SUPABASE_ANON_KEY.
        unsafe { std::env::remove_var("SUPABASE_ANON_KEY") };
        let err = SupabaseSettings::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("Missing Supabase credentials"));
    }

    #[test]
    fn settings_carry_timeouts() {
        let config = SupabaseConfig {
            url: Some("https://abc.supabase.co".into()),
            anon_key: Some("anon".into()),
            timeout_secs: 7,
            heartbeat_secs: 3,
            ..Default::default()
        };
        let settings = SupabaseSettings::from_config(&config).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(7));
        assert_eq!(settings.heartbeat, Duration::from_secs(3));
        assert_eq!(settings.ai_function, "generate-ai-response");
    }
}

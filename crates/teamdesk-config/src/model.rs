// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Teamdesk.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Teamdesk configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TeamdeskConfig {
    /// Application identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// Hosted store (PostgREST, realtime, edge functions).
    #[serde(default)]
    pub supabase: SupabaseConfig,

    /// Direct generative endpoint settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// AI relay HTTP server.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Chat session behavior.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Local cache database.
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Id of the `users` row the CLI acts as. Write commands are refused
    /// when unset.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
            user_id: None,
        }
    }
}

fn default_app_name() -> String {
    "teamdesk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Hosted store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`. Falls back to `SUPABASE_URL`.
    #[serde(default)]
    pub url: Option<String>,

    /// Anonymous API key. Falls back to `SUPABASE_ANON_KEY`.
    #[serde(default)]
    pub anon_key: Option<String>,

    /// Name of the edge function that relays AI prompts.
    #[serde(default = "default_ai_function")]
    pub ai_function: String,

    /// Request timeout for REST and function calls, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Realtime heartbeat interval, in seconds.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            ai_function: default_ai_function(),
            timeout_secs: default_timeout_secs(),
            heartbeat_secs: default_heartbeat_secs(),
        }
    }
}

fn default_ai_function() -> String {
    "generate-ai-response".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_heartbeat_secs() -> u64 {
    25
}

/// Generative endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. Falls back to `GEMINI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// AI relay server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    #[serde(default = "default_relay_host")]
    pub host: String,

    #[serde(default = "default_relay_port")]
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_relay_host(),
            port: default_relay_port(),
        }
    }
}

fn default_relay_host() -> String {
    "127.0.0.1".to_string()
}

fn default_relay_port() -> u16 {
    8787
}

/// Which AI path chat sessions use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponderMode {
    /// Through the hosted relay function.
    #[default]
    Relay,
    /// Straight to the generative endpoint.
    Direct,
}

/// Chat session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Messages per history page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default)]
    pub responder: ResponderMode,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            responder: ResponderMode::default(),
        }
    }
}

fn default_page_size() -> u32 {
    20
}

/// Local cache database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite cache file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("teamdesk").join("cache.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("teamdesk-cache.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Returns the configured value when non-empty, else the named environment variable.
pub fn resolve_with_env(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok().filter(|v| !v.trim().is_empty()))
}

impl SupabaseConfig {
    /// Project URL from config or `SUPABASE_URL`.
    pub fn resolved_url(&self) -> Option<String> {
        resolve_with_env(self.url.as_deref(), "SUPABASE_URL")
    }

    /// Anonymous key from config or `SUPABASE_ANON_KEY`.
    pub fn resolved_anon_key(&self) -> Option<String> {
        resolve_with_env(self.anon_key.as_deref(), "SUPABASE_ANON_KEY")
    }
}

impl GeminiConfig {
    /// API key from config or `GEMINI_API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_with_env(self.api_key.as_deref(), "GEMINI_API_KEY")
    }
}

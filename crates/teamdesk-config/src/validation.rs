// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::TeamdeskConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const MAX_PAGE_SIZE: u32 = 1000;

/// Validate semantic constraints serde cannot express.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &TeamdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "app.log_level `{}` must be one of: {}",
            config.app.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    let host = config.relay.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("relay.host must not be empty"));
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::validation(format!(
                "relay.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.chat.page_size == 0 || config.chat.page_size > MAX_PAGE_SIZE {
        errors.push(ConfigError::validation(format!(
            "chat.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
            config.chat.page_size
        )));
    }

    if let Some(url) = config.supabase.url.as_deref()
        && !url.trim().is_empty()
        && !(url.starts_with("https://") || url.starts_with("http://"))
    {
        errors.push(ConfigError::validation(format!(
            "supabase.url `{url}` must start with http:// or https://"
        )));
    }

    if config.supabase.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "supabase.timeout_secs must be greater than 0",
        ));
    }

    if config.supabase.heartbeat_secs == 0 {
        errors.push(ConfigError::validation(
            "supabase.heartbeat_secs must be greater than 0",
        ));
    }

    if config.supabase.ai_function.trim().is_empty() {
        errors.push(ConfigError::validation(
            "supabase.ai_function must not be empty",
        ));
    }

    if config.gemini.model.trim().is_empty() {
        errors.push(ConfigError::validation("gemini.model must not be empty"));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

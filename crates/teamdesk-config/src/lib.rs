// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Teamdesk.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `TEAMDESK_*` environment overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use teamdesk_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("chat page size: {}", config.chat.page_size);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::TeamdeskConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// On a Figment error the TOML sources are re-read so diagnostics can point
/// at the offending key.
pub fn load_and_validate() -> Result<TeamdeskConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            tracing::debug!(page_size = config.chat.page_size, "configuration loaded");
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from an explicit file path (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<TeamdeskConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<TeamdeskConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Render the effective configuration as TOML, with secrets masked.
pub fn render_effective(config: &TeamdeskConfig) -> Result<String, ConfigError> {
    let mut masked = config.clone();
    for secret in [&mut masked.supabase.anon_key, &mut masked.gemini.api_key] {
        if secret.is_some() {
            *secret = Some("********".to_string());
        }
    }
    toml::to_string_pretty(&masked).map_err(|e| ConfigError::Other(e.to_string()))
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string("teamdesk.toml") {
        let path = std::env::current_dir()
            .map(|d| d.join("teamdesk.toml").display().to_string())
            .unwrap_or_else(|_| "teamdesk.toml".to_string());
        sources.push((path, content));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("teamdesk/teamdesk.toml");
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    let system_path = std::path::Path::new("/etc/teamdesk/teamdesk.toml");
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}

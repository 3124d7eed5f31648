// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered config loading with Figment.
//!
//! `./teamdesk.toml` > `~/.config/teamdesk/teamdesk.toml` > `/etc/teamdesk/teamdesk.toml`,
//! with `TEAMDESK_*` environment variables on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TeamdeskConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/teamdesk/teamdesk.toml`
/// 3. `~/.config/teamdesk/teamdesk.toml`
/// 4. `./teamdesk.toml`
/// 5. `TEAMDESK_*` environment variables
pub fn load_config() -> Result<TeamdeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TeamdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TeamdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TeamdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TeamdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TeamdeskConfig::default()))
        .merge(Toml::file("/etc/teamdesk/teamdesk.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("teamdesk/teamdesk.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("teamdesk.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `TEAMDESK_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` so keys containing
/// underscores survive: `TEAMDESK_SUPABASE_ANON_KEY` -> `supabase.anon_key`.
fn env_provider() -> Env {
    Env::prefixed("TEAMDESK_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("app_", "app.", 1)
            .replacen("supabase_", "supabase.", 1)
            .replacen("gemini_", "gemini.", 1)
            .replacen("relay_", "relay.", 1)
            .replacen("chat_", "chat.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}

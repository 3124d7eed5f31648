// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the concrete adapters from configuration.

use std::sync::Arc;

use tracing::info;

use teamdesk_config::TeamdeskConfig;
use teamdesk_config::model::ResponderMode;
use teamdesk_core::{AiResponder, TeamdeskError};
use teamdesk_gemini::GeminiResponder;
use teamdesk_storage::SqliteMessageCache;
use teamdesk_supabase::{FunctionResponder, SupabaseSettings, SupabaseStore};

pub fn store(config: &TeamdeskConfig) -> Result<Arc<SupabaseStore>, TeamdeskError> {
    let settings = SupabaseSettings::from_config(&config.supabase)?;
    Ok(Arc::new(SupabaseStore::new(&settings)?))
}

/// The responder chat sessions use, chosen by `chat.responder`.
pub fn chat_responder(config: &TeamdeskConfig) -> Result<Arc<dyn AiResponder>, TeamdeskError> {
    match config.chat.responder {
        ResponderMode::Relay => {
            let settings = SupabaseSettings::from_config(&config.supabase)?;
            let responder = FunctionResponder::new(&settings)?;
            info!(url = responder.url(), "using relayed AI responder");
            Ok(Arc::new(responder))
        }
        ResponderMode::Direct => Ok(Arc::new(GeminiResponder::new(&config.gemini)?)),
    }
}

pub async fn cache(config: &TeamdeskConfig) -> Result<Arc<SqliteMessageCache>, TeamdeskError> {
    let cache = SqliteMessageCache::new(config.storage.clone());
    cache.initialize().await?;
    Ok(Arc::new(cache))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_mode_builds_without_store_credentials() {
        let config = teamdesk_config::load_and_validate_str(
            "[chat]\nresponder = \"direct\"\n[gemini]\napi_key = \"test-key\"\n",
        )
        .unwrap();
        let responder = chat_responder(&config).unwrap();
        assert_eq!(responder.name(), "gemini");
    }
}

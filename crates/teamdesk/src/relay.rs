// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `teamdesk relay` command implementation.
//!
//! Serves the AI relay with the generative responder, so the API key never
//! leaves this process.

use std::sync::Arc;

use tracing::info;

use teamdesk_config::TeamdeskConfig;
use teamdesk_core::{PluginAdapter, TeamdeskError};
use teamdesk_gemini::GeminiResponder;
use teamdesk_relay::{RelayState, start_server};

use crate::shutdown;

pub async fn run_relay(config: &TeamdeskConfig) -> Result<(), TeamdeskError> {
    let responder = Arc::new(GeminiResponder::new(&config.gemini)?);
    let cancel = shutdown::install_signal_handler();

    info!(host = %config.relay.host, port = config.relay.port, "starting relay");
    start_server(
        &config.relay.host,
        config.relay.port,
        RelayState::new(responder.clone()),
        cancel,
    )
    .await?;

    responder.shutdown().await
}

// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI response service.

use async_trait::async_trait;

use crate::error::TeamdeskError;
use crate::traits::adapter::PluginAdapter;

/// Turns one prompt into one completion.
///
/// Calls are stateless: no history is carried between them, and failures are
/// classified as [`AiErrorKind`](crate::error::AiErrorKind) inside
/// [`TeamdeskError::Provider`].
#[async_trait]
pub trait AiResponder: PluginAdapter {
    async fn respond(&self, prompt: &str) -> Result<String, TeamdeskError>;
}

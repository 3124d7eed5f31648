// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local conversation cache.

use async_trait::async_trait;

use crate::error::TeamdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatMessage, MemberId};

/// Cache key for a member's conversation snapshot.
pub fn cache_key(member_id: &MemberId) -> String {
    format!("chat_{member_id}")
}

/// Key/value snapshot store for the first page of each conversation.
#[async_trait]
pub trait MessageCache: PluginAdapter {
    /// Returns the cached snapshot, or `None` when absent.
    async fn load(&self, key: &str) -> Result<Option<Vec<ChatMessage>>, TeamdeskError>;

    /// Replaces the snapshot under `key`.
    async fn store(&self, key: &str, messages: &[ChatMessage]) -> Result<(), TeamdeskError>;

    /// Drops the snapshot under `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), TeamdeskError>;
}

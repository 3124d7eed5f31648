// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote chat store: paged history, batch persistence, and live inserts.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TeamdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatMessage, MemberId, NewChatMessage};

/// Callback invoked for every pushed insert. May run on any task.
pub type InsertCallback = Arc<dyn Fn(ChatMessage) + Send + Sync>;

/// Handle to an open realtime subscription.
pub trait Subscription: Send + Sync {
    /// Closes the channel. Further inserts are not delivered. Idempotent.
    fn unsubscribe(&self);
}

/// Translation point between the chat view-model and the hosted store.
#[async_trait]
pub trait ChatStore: PluginAdapter {
    /// Fetches one page of a conversation, newest first.
    ///
    /// Page `p` covers rows `[(p-1)*page_size, p*page_size-1]`. A page shorter
    /// than `page_size` is the only end-of-history signal.
    async fn fetch_page(
        &self,
        member_id: &MemberId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<ChatMessage>, TeamdeskError>;

    /// Inserts all rows in one atomic request and returns them with
    /// server-assigned ids, in insertion order.
    async fn insert_batch(
        &self,
        messages: Vec<NewChatMessage>,
    ) -> Result<Vec<ChatMessage>, TeamdeskError>;

    /// Opens one realtime channel delivering inserts for `member_id`.
    ///
    /// Missed events are not replayed after a disconnect.
    async fn subscribe(
        &self,
        member_id: &MemberId,
        on_insert: InsertCallback,
    ) -> Result<Box<dyn Subscription>, TeamdeskError>;
}

// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for Teamdesk.
//!
//! Deterministic, in-process stand-ins for the remote store, the AI
//! responder, the local cache, and the notice surface, so chat and relay
//! behavior can be tested without network or disk.
//!
//! # Components
//!
//! - [`MockStore`] - scripted pages, gated fetches, recorded inserts, push injection
//! - [`MockResponder`] - queued replies or classified failures
//! - [`InMemoryCache`] - map-backed cache recording removals
//! - [`RecordingNotices`] - captures every notice shown to the user

pub mod mock_cache;
pub mod mock_responder;
pub mod mock_store;
pub mod notices;

pub use mock_cache::InMemoryCache;
pub use mock_responder::MockResponder;
pub use mock_store::MockStore;
pub use notices::RecordingNotices;

use chrono::{DateTime, TimeZone, Utc};
use teamdesk_core::{ChatMessage, MemberId, MessageId, MessageKind, Sender};

/// A persisted message with a fixed timestamp `minute` minutes after
/// 2024-03-11 09:00 UTC.
pub fn persisted(member: &str, id: &str, kind: MessageKind, content: &str, minute: i64) -> ChatMessage {
    let timestamp = at_minute(minute);
    ChatMessage {
        id: MessageId::Persisted(id.to_string()),
        team_member_id: MemberId::new(member),
        sender: match kind {
            MessageKind::Human => Sender::User,
            MessageKind::Ai => Sender::Ai,
        },
        content: content.to_string(),
        kind,
        timestamp,
        created_at: timestamp,
    }
}

/// `persisted` rows numbered `from..from+count`, returned newest first
/// the way the store pages them.
pub fn history_page(member: &str, from: usize, count: usize) -> Vec<ChatMessage> {
    (from..from + count)
        .rev()
        .map(|n| {
            persisted(
                member,
                &format!("row-{n}"),
                if n % 2 == 0 { MessageKind::Human } else { MessageKind::Ai },
                &format!("message {n}"),
                n as i64,
            )
        })
        .collect()
}

pub fn at_minute(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0)
        .single()
        .unwrap_or_default()
        + chrono::Duration::minutes(minute)
}

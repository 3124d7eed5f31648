// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat message types and adapter bookkeeping types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Prefix marking a client-created identifier that the store has not confirmed.
pub const PENDING_ID_PREFIX: &str = "pending:";

/// Identifier of an AI team member a conversation belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a chat message.
///
/// Messages created locally carry a `Pending` id in their own namespace until
/// the store assigns a `Persisted` one, so the two can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageId {
    Pending(Uuid),
    Persisted(String),
}

impl MessageId {
    /// A fresh client-side identifier.
    pub fn pending() -> Self {
        MessageId::Pending(Uuid::new_v4())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, MessageId::Pending(_))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Pending(uuid) => write!(f, "{PENDING_ID_PREFIX}{uuid}"),
            MessageId::Persisted(id) => f.write_str(id),
        }
    }
}

impl Serialize for MessageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The store may hand out integer or text primary keys.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => MessageId::Persisted(n.to_string()),
            RawId::Text(text) => match text
                .strip_prefix(PENDING_ID_PREFIX)
                .and_then(|rest| Uuid::parse_str(rest).ok())
            {
                Some(uuid) => MessageId::Pending(uuid),
                None => MessageId::Persisted(text),
            },
        })
    }
}

/// Who authored a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// Message kind as stored in the `type` column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Human,
    Ai,
}

/// One message in a conversation with an AI team member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub team_member_id: MemberId,
    pub sender: Sender,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// A locally authored message, stamped now, with a pending id.
    pub fn human(member_id: &MemberId, content: impl Into<String>) -> Self {
        Self::pending(member_id, Sender::User, MessageKind::Human, content.into())
    }

    /// A locally received AI reply, stamped now, with a pending id.
    pub fn ai(member_id: &MemberId, content: impl Into<String>) -> Self {
        Self::pending(member_id, Sender::Ai, MessageKind::Ai, content.into())
    }

    fn pending(member_id: &MemberId, sender: Sender, kind: MessageKind, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: MessageId::pending(),
            team_member_id: member_id.clone(),
            sender,
            content,
            kind,
            timestamp: now,
            created_at: now,
        }
    }

    /// Strips the identifier, producing the row to insert.
    pub fn to_new(&self) -> NewChatMessage {
        NewChatMessage {
            team_member_id: self.team_member_id.clone(),
            sender: self.sender,
            content: self.content.clone(),
            kind: self.kind,
            timestamp: self.timestamp,
            created_at: self.created_at,
        }
    }
}

/// A chat message row without an identifier, as sent to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewChatMessage {
    pub team_member_id: MemberId,
    pub sender: Sender,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Inclusive row window `[start, end]` for a 1-based page.
pub fn page_window(page: u32, page_size: u32) -> (u64, u64) {
    let page = u64::from(page.max(1));
    let size = u64::from(page_size.max(1));
    let start = (page - 1) * size;
    (start, start + size - 1)
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Store,
    Responder,
    Cache,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_ids_survive_json() {
        let id = MessageId::pending();
        let json = serde_json::to_string(&id).unwrap();
        assert!(json.starts_with("\"pending:"));
        let back: MessageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(back.is_pending());
    }

    #[test]
    fn server_ids_accept_text_and_integers() {
        let text: MessageId = serde_json::from_str("\"9b2f-row\"").unwrap();
        assert_eq!(text, MessageId::Persisted("9b2f-row".into()));

        let number: MessageId = serde_json::from_str("42").unwrap();
        assert_eq!(number, MessageId::Persisted("42".into()));
    }

    #[test]
    fn malformed_pending_prefix_is_treated_as_server_id() {
        let id: MessageId = serde_json::from_str("\"pending:not-a-uuid\"").unwrap();
        assert_eq!(id, MessageId::Persisted("pending:not-a-uuid".into()));
    }

    #[test]
    fn store_row_deserializes_with_offset_timestamps() {
        let row = serde_json::json!({
            "id": 7,
            "team_member_id": "backend-dev",
            "sender": "ai",
            "content": "Deployed.",
            "type": "ai",
            "timestamp": "2024-03-11T09:15:00.123456+00:00",
            "created_at": "2024-03-11T09:15:00+00:00"
        });
        let msg: ChatMessage = serde_json::from_value(row).unwrap();
        assert_eq!(msg.id, MessageId::Persisted("7".into()));
        assert_eq!(msg.sender, Sender::Ai);
        assert_eq!(msg.kind, MessageKind::Ai);
        assert_eq!(msg.timestamp.timestamp(), 1710148500);
    }

    #[test]
    fn new_row_has_no_id_column() {
        let member = MemberId::new("qa");
        let msg = ChatMessage::human(&member, "hello");
        let row = serde_json::to_value(msg.to_new()).unwrap();
        assert!(row.get("id").is_none());
        assert_eq!(row["type"], "human");
        assert_eq!(row["sender"], "user");
        assert_eq!(row["team_member_id"], "qa");
    }

    #[test]
    fn page_windows_are_inclusive() {
        assert_eq!(page_window(1, 20), (0, 19));
        assert_eq!(page_window(2, 20), (20, 39));
        assert_eq!(page_window(0, 20), (0, 19));
    }
}

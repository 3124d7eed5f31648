// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`ChatStore`] over the `chat_messages` table.

use async_trait::async_trait;
use tracing::{debug, info};

use teamdesk_core::types::page_window;
use teamdesk_core::{
    ChatMessage, ChatStore, InsertCallback, MemberId, NewChatMessage, Subscription, TeamdeskError,
};

use crate::SupabaseStore;
use crate::client::eq;
use crate::realtime::{self, ChannelFilter};

const TABLE: &str = "chat_messages";

#[async_trait]
impl ChatStore for SupabaseStore {
    async fn fetch_page(
        &self,
        member_id: &MemberId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<ChatMessage>, TeamdeskError> {
        let (start, end) = page_window(page, page_size);
        debug!(member = %member_id, page, start, end, "fetching chat messages");
        let query = vec![
            eq("team_member_id", member_id),
            ("order", "timestamp.desc".to_string()),
            ("offset", start.to_string()),
            ("limit", (end - start + 1).to_string()),
        ];
        self.rest()
            .select(TABLE, &query, "fetch chat messages")
            .await
    }

    async fn insert_batch(
        &self,
        messages: Vec<NewChatMessage>,
    ) -> Result<Vec<ChatMessage>, TeamdeskError> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }
        let count = messages.len();
        let saved: Vec<ChatMessage> = self
            .rest()
            .insert(TABLE, &messages, "save chat messages")
            .await?;
        info!(count, "chat messages saved");
        Ok(saved)
    }

    async fn subscribe(
        &self,
        member_id: &MemberId,
        on_insert: InsertCallback,
    ) -> Result<Box<dyn Subscription>, TeamdeskError> {
        let filter = ChannelFilter::chat_inserts(member_id);
        let subscription = realtime::subscribe(
            self.rest().base_url(),
            self.rest().anon_key(),
            filter,
            self.heartbeat,
            on_insert,
        )
        .await?;
        Ok(Box::new(subscription))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::SupabaseSettings;
    use teamdesk_core::{MessageId, MessageKind, Sender};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> SupabaseStore {
        SupabaseStore::new(&SupabaseSettings {
            url: server.uri(),
            anon_key: "anon".into(),
            ai_function: "generate-ai-response".into(),
            timeout: Duration::from_secs(5),
            heartbeat: Duration::from_secs(25),
        })
        .unwrap()
    }

    fn row(id: i64, content: &str, ts: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "team_member_id": "architect",
            "sender": "ai",
            "content": content,
            "type": "ai",
            "timestamp": ts,
            "created_at": ts
        })
    }

    #[tokio::test]
    async fn second_page_uses_offset_window_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chat_messages"))
            .and(query_param("team_member_id", "eq.architect"))
            .and(query_param("order", "timestamp.desc"))
            .and(query_param("offset", "20"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                row(22, "older", "2024-03-11T09:00:00+00:00"),
                row(21, "oldest", "2024-03-11T08:00:00+00:00"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let page = store(&server)
            .fetch_page(&MemberId::new("architect"), 2, 20)
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, MessageId::Persisted("22".into()));
        assert!(page[0].timestamp > page[1].timestamp);
    }

    #[tokio::test]
    async fn fetch_failure_names_operation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chat_messages"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"message": "boom"})),
            )
            .mount(&server)
            .await;

        let err = store(&server)
            .fetch_page(&MemberId::new("architect"), 1, 20)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch chat messages: boom");
    }

    #[tokio::test]
    async fn batch_insert_is_one_request_without_ids() {
        let server = MockServer::start().await;
        let member = MemberId::new("architect");
        let first = ChatMessage::human(&member, "hi");
        let second = ChatMessage::ai(&member, "hello");
        let expected_body = serde_json::to_value(vec![first.to_new(), second.to_new()]).unwrap();

        Mock::given(method("POST"))
            .and(path("/rest/v1/chat_messages"))
            .and(body_json(&expected_body))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([
                row(100, "hi", "2024-03-11T09:00:00+00:00"),
                row(101, "hello", "2024-03-11T09:00:01+00:00"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let saved = store(&server)
            .insert_batch(vec![first.to_new(), second.to_new()])
            .await
            .unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].id, MessageId::Persisted("101".into()));
        assert_eq!(saved[1].sender, Sender::Ai);
        assert_eq!(saved[1].kind, MessageKind::Ai);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let saved = store(&server).insert_batch(Vec::new()).await.unwrap();
        assert!(saved.is_empty());
    }
}

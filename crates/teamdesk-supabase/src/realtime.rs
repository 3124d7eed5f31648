// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime channel client (Phoenix protocol over a websocket).
//!
//! One socket per subscription: join a `postgres_changes` channel, forward
//! every matching insert to the callback, and heartbeat on the `phoenix`
//! topic until the [`CancellationToken`] fires. Missed events are not replayed.

use std::time::Duration;

use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use teamdesk_core::{ChatMessage, InsertCallback, MemberId, Subscription, TeamdeskError};

/// Protocol version appended to the socket URL.
pub const PROTOCOL_VSN: &str = "1.0.0";

const JOIN_REF: &str = "1";

/// One Phoenix frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl PhoenixMessage {
    pub fn new(topic: &str, event: &str, payload: Value, reference: impl ToString) -> Self {
        Self {
            topic: topic.to_string(),
            event: event.to_string(),
            payload,
            reference: Some(reference.to_string()),
        }
    }

    fn to_frame(&self) -> Result<Message, TeamdeskError> {
        let text = serde_json::to_string(self).map_err(|e| TeamdeskError::Realtime {
            message: format!("failed to encode {} frame: {e}", self.event),
            source: Some(Box::new(e)),
        })?;
        Ok(Message::Text(text.into()))
    }
}

/// Row-change filter a channel is joined with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFilter {
    pub event: String,
    pub schema: String,
    pub table: String,
    pub filter: String,
    pub channel: String,
}

impl ChannelFilter {
    /// Inserts into `chat_messages` for one member.
    pub fn chat_inserts(member_id: &MemberId) -> Self {
        Self {
            event: "INSERT".into(),
            schema: "public".into(),
            table: "chat_messages".into(),
            filter: format!("team_member_id=eq.{member_id}"),
            channel: format!("chat_messages:{member_id}"),
        }
    }

    pub fn topic(&self) -> String {
        format!("realtime:{}", self.channel)
    }

    /// `phx_join` frame for this filter.
    pub fn join_message(&self, access_token: &str) -> PhoenixMessage {
        let payload = json!({
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [{
                    "event": self.event,
                    "schema": self.schema,
                    "table": self.table,
                    "filter": self.filter,
                }],
            },
            "access_token": access_token,
        });
        PhoenixMessage::new(&self.topic(), "phx_join", payload, JOIN_REF)
    }
}

/// `{url}` with a websocket scheme and the realtime path.
pub fn websocket_url(base_url: &str, anon_key: &str) -> Result<Url, TeamdeskError> {
    let mut url = Url::parse(base_url).map_err(|e| TeamdeskError::Realtime {
        message: format!("invalid store URL `{base_url}`: {e}"),
        source: Some(Box::new(e)),
    })?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(TeamdeskError::Realtime {
                message: format!("unsupported URL scheme `{other}` for realtime"),
                source: None,
            });
        }
    };
    url.set_scheme(scheme).map_err(|()| TeamdeskError::Realtime {
        message: format!("cannot use scheme `{scheme}` for `{base_url}`"),
        source: None,
    })?;
    url.set_path("/realtime/v1/websocket");
    url.query_pairs_mut()
        .clear()
        .append_pair("apikey", anon_key)
        .append_pair("vsn", PROTOCOL_VSN);
    Ok(url)
}

/// What an incoming frame means for a channel.
#[derive(Debug, PartialEq)]
pub enum Inbound {
    Insert(Box<ChatMessage>),
    Joined,
    JoinRejected(String),
    ChannelClosed(String),
    Ignored,
}

/// Interpret a text frame received on `topic`.
pub fn classify(text: &str, topic: &str) -> Inbound {
    let Ok(frame) = serde_json::from_str::<PhoenixMessage>(text) else {
        warn!(topic, "undecodable realtime frame");
        return Inbound::Ignored;
    };
    if frame.topic != topic {
        return Inbound::Ignored;
    }

    match frame.event.as_str() {
        "phx_reply" if frame.reference.as_deref() == Some(JOIN_REF) => {
            match frame.payload.get("status").and_then(Value::as_str) {
                Some("ok") => Inbound::Joined,
                _ => Inbound::JoinRejected(frame.payload["response"].to_string()),
            }
        }
        "postgres_changes" => {
            let data = &frame.payload["data"];
            if data["type"].as_str().is_some_and(|t| t != "INSERT") {
                return Inbound::Ignored;
            }
            match serde_json::from_value::<ChatMessage>(data["record"].clone()) {
                Ok(message) => Inbound::Insert(Box::new(message)),
                Err(e) => {
                    warn!(topic, error = %e, "realtime insert did not decode as a chat message");
                    Inbound::Ignored
                }
            }
        }
        "phx_error" | "phx_close" => Inbound::ChannelClosed(frame.event),
        _ => Inbound::Ignored,
    }
}

/// Handle to a running channel. Dropping it also closes the channel.
#[derive(Debug)]
pub struct RealtimeSubscription {
    topic: String,
    cancel: CancellationToken,
}

impl RealtimeSubscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Subscription for RealtimeSubscription {
    fn unsubscribe(&self) {
        if !self.cancel.is_cancelled() {
            debug!(topic = %self.topic, "unsubscribing");
            self.cancel.cancel();
        }
    }
}

impl Drop for RealtimeSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Connect, join the channel, and spawn the read/heartbeat task.
pub async fn subscribe(
    base_url: &str,
    anon_key: &str,
    filter: ChannelFilter,
    heartbeat: Duration,
    on_insert: InsertCallback,
) -> Result<RealtimeSubscription, TeamdeskError> {
    let url = websocket_url(base_url, anon_key)?;
    let topic = filter.topic();

    let (stream, _response) =
        connect_async(url.as_str())
            .await
            .map_err(|e| TeamdeskError::Realtime {
                message: format!("failed to connect realtime socket: {e}"),
                source: Some(Box::new(e)),
            })?;
    let (mut sink, source) = stream.split();

    sink.send(filter.join_message(anon_key).to_frame()?)
        .await
        .map_err(|e| TeamdeskError::Realtime {
            message: format!("failed to join {topic}: {e}"),
            source: Some(Box::new(e)),
        })?;
    debug!(topic, "join sent");

    let cancel = CancellationToken::new();
    tokio::spawn(run_channel(
        sink,
        source,
        topic.clone(),
        heartbeat,
        on_insert,
        cancel.clone(),
    ));

    Ok(RealtimeSubscription { topic, cancel })
}

async fn run_channel<S, R>(
    mut sink: S,
    mut source: R,
    topic: String,
    heartbeat: Duration,
    on_insert: InsertCallback,
    cancel: CancellationToken,
) where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let mut ticker = tokio::time::interval(heartbeat);
    ticker.tick().await;
    let mut next_ref: u64 = 2;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let leave = PhoenixMessage::new(&topic, "phx_leave", json!({}), next_ref);
                if let Ok(frame) = leave.to_frame() {
                    let _ = sink.send(frame).await;
                }
                let _ = sink.close().await;
                debug!(topic, "realtime channel closed");
                break;
            }
            _ = ticker.tick() => {
                let beat = PhoenixMessage::new("phoenix", "heartbeat", json!({}), next_ref);
                next_ref += 1;
                let sent = match beat.to_frame() {
                    Ok(frame) => sink.send(frame).await.map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                if let Err(e) = sent {
                    error!(topic, error = %e, "realtime heartbeat failed");
                    break;
                }
            }
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => match classify(text.as_str(), &topic) {
                    Inbound::Insert(message) => {
                        debug!(topic, id = %message.id, "insert received");
                        on_insert(*message);
                    }
                    Inbound::Joined => info!(topic, "subscribed to chat messages"),
                    Inbound::JoinRejected(reason) => {
                        error!(topic, reason, "failed to subscribe to chat messages");
                    }
                    Inbound::ChannelClosed(event) => {
                        warn!(topic, event, "realtime channel closed by server");
                        break;
                    }
                    Inbound::Ignored => {}
                },
                Some(Ok(Message::Close(reason))) => {
                    warn!(topic, ?reason, "realtime socket closed by server");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!(topic, error = %e, "realtime socket error");
                    break;
                }
                None => {
                    warn!(topic, "realtime socket ended");
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_url_switches_scheme_and_carries_key() {
        let url = websocket_url("https://abc.supabase.co", "anon").unwrap();
        assert_eq!(
            url.as_str(),
            "wss://abc.supabase.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );
        let local = websocket_url("http://127.0.0.1:54321/", "k").unwrap();
        assert!(local.as_str().starts_with("ws://127.0.0.1:54321/realtime/v1/websocket?"));
        assert!(websocket_url("ftp://x", "k").is_err());
    }

    #[test]
    fn join_frame_filters_inserts_for_member() {
        let filter = ChannelFilter::chat_inserts(&MemberId::new("qa-tester"));
        let join = filter.join_message("anon");
        assert_eq!(join.topic, "realtime:chat_messages:qa-tester");
        assert_eq!(join.event, "phx_join");
        let change = &join.payload["config"]["postgres_changes"][0];
        assert_eq!(change["event"], "INSERT");
        assert_eq!(change["table"], "chat_messages");
        assert_eq!(change["filter"], "team_member_id=eq.qa-tester");
        assert_eq!(join.payload["access_token"], "anon");
    }

    #[test]
    fn insert_frames_decode_into_messages() {
        let frame = json!({
            "topic": "realtime:chat_messages:qa",
            "event": "postgres_changes",
            "ref": null,
            "payload": {
                "ids": [1],
                "data": {
                    "type": "INSERT",
                    "schema": "public",
                    "table": "chat_messages",
                    "record": {
                        "id": 55,
                        "team_member_id": "qa",
                        "sender": "user",
                        "content": "run the suite",
                        "type": "human",
                        "timestamp": "2024-03-12T10:00:00.5+00:00",
                        "created_at": "2024-03-12T10:00:00.5+00:00"
                    }
                }
            }
        });
        match classify(&frame.to_string(), "realtime:chat_messages:qa") {
            Inbound::Insert(message) => assert_eq!(message.content, "run the suite"),
            other => panic!("expected insert, got {other:?}"),
        }
    }

    #[test]
    fn frames_for_other_topics_are_ignored() {
        let frame = json!({"topic": "phoenix", "event": "phx_reply", "ref": "1", "payload": {"status": "ok"}});
        assert_eq!(
            classify(&frame.to_string(), "realtime:chat_messages:qa"),
            Inbound::Ignored
        );
    }

    #[test]
    fn join_error_reply_is_reported() {
        let frame = json!({
            "topic": "realtime:chat_messages:qa",
            "event": "phx_reply",
            "ref": "1",
            "payload": {"status": "error", "response": {"reason": "unauthorized"}}
        });
        assert!(matches!(
            classify(&frame.to_string(), "realtime:chat_messages:qa"),
            Inbound::JoinRejected(reason) if reason.contains("unauthorized")
        ));
    }
}

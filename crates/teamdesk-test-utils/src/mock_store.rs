// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock remote chat store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::watch;

use teamdesk_core::{
    AdapterType, ChatMessage, ChatStore, HealthStatus, InsertCallback, MemberId, MessageId,
    NewChatMessage, PluginAdapter, Subscription, TeamdeskError,
};

/// One recorded `fetch_page` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub member_id: MemberId,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Default)]
struct State {
    pages: HashMap<u32, Result<Vec<ChatMessage>, String>>,
    fetches: Vec<FetchCall>,
    batches: Vec<Vec<NewChatMessage>>,
    insert_error: Option<String>,
    subscribe_error: Option<String>,
    callback: Option<InsertCallback>,
    subscriptions: usize,
}

/// Scripted [`ChatStore`].
///
/// Pages are served from a per-page script (unscripted pages are empty).
/// Fetches and inserts can be held open to observe intermediate states.
/// Inserts are recorded and assigned ids `srv-<n>`. [`MockStore::push`]
/// delivers a live insert through the active subscription.
#[derive(Clone)]
pub struct MockStore {
    state: Arc<Mutex<State>>,
    gate: Arc<watch::Sender<bool>>,
    insert_gate: Arc<watch::Sender<bool>>,
    next_id: Arc<AtomicUsize>,
    unsubscribed: Arc<AtomicBool>,
}

impl MockStore {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        let (insert_gate, _) = watch::channel(true);
        Self {
            state: Arc::new(Mutex::new(State::default())),
            gate: Arc::new(gate),
            insert_gate: Arc::new(insert_gate),
            next_id: Arc::new(AtomicUsize::new(1)),
            unsubscribed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn set_page(&self, page: u32, rows: Vec<ChatMessage>) {
        self.state().pages.insert(page, Ok(rows));
    }

    pub fn fail_page(&self, page: u32, detail: &str) {
        self.state().pages.insert(page, Err(detail.to_string()));
    }

    pub fn fail_inserts(&self, detail: &str) {
        self.state().insert_error = Some(detail.to_string());
    }

    pub fn fail_subscribe(&self, detail: &str) {
        self.state().subscribe_error = Some(detail.to_string());
    }

    /// Make fetches wait until [`MockStore::release_fetches`].
    pub fn hold_fetches(&self) {
        self.gate.send_replace(false);
    }

    pub fn release_fetches(&self) {
        self.gate.send_replace(true);
    }

    /// Make inserts wait until [`MockStore::release_inserts`].
    pub fn hold_inserts(&self) {
        self.insert_gate.send_replace(false);
    }

    pub fn release_inserts(&self) {
        self.insert_gate.send_replace(true);
    }

    pub fn fetches(&self) -> Vec<FetchCall> {
        self.state().fetches.clone()
    }

    pub fn inserted_batches(&self) -> Vec<Vec<NewChatMessage>> {
        self.state().batches.clone()
    }

    pub fn subscriptions(&self) -> usize {
        self.state().subscriptions
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.unsubscribed.load(Ordering::SeqCst)
    }

    /// Deliver a live insert. Returns false when nobody is subscribed.
    pub fn push(&self, message: ChatMessage) -> bool {
        if self.is_unsubscribed() {
            return false;
        }
        let callback = self.state().callback.clone();
        match callback {
            Some(callback) => {
                callback(message);
                true
            }
            None => false,
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

struct MockSubscription {
    unsubscribed: Arc<AtomicBool>,
}

impl Subscription for MockSubscription {
    fn unsubscribe(&self) {
        self.unsubscribed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PluginAdapter for MockStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, TeamdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TeamdeskError> {
        Ok(())
    }
}

#[async_trait]
impl ChatStore for MockStore {
    async fn fetch_page(
        &self,
        member_id: &MemberId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<ChatMessage>, TeamdeskError> {
        self.state().fetches.push(FetchCall {
            member_id: member_id.clone(),
            page,
            page_size,
        });

        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        let scripted = self.state().pages.get(&page).cloned();
        match scripted {
            Some(Ok(rows)) => Ok(rows),
            Some(Err(detail)) => Err(TeamdeskError::store("fetch chat messages", detail)),
            None => Ok(Vec::new()),
        }
    }

    async fn insert_batch(
        &self,
        messages: Vec<NewChatMessage>,
    ) -> Result<Vec<ChatMessage>, TeamdeskError> {
        self.state().batches.push(messages.clone());

        let mut gate = self.insert_gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        if let Some(detail) = self.state().insert_error.clone() {
            return Err(TeamdeskError::store("save chat messages", detail));
        }

        Ok(messages
            .into_iter()
            .map(|m| ChatMessage {
                id: MessageId::Persisted(format!(
                    "srv-{}",
                    self.next_id.fetch_add(1, Ordering::SeqCst)
                )),
                team_member_id: m.team_member_id,
                sender: m.sender,
                content: m.content,
                kind: m.kind,
                timestamp: m.timestamp,
                created_at: m.created_at,
            })
            .collect())
    }

    async fn subscribe(
        &self,
        _member_id: &MemberId,
        on_insert: InsertCallback,
    ) -> Result<Box<dyn Subscription>, TeamdeskError> {
        let mut state = self.state();
        state.subscriptions += 1;
        if let Some(detail) = state.subscribe_error.clone() {
            return Err(TeamdeskError::Realtime {
                message: detail,
                source: None,
            });
        }
        state.callback = Some(on_insert);
        self.unsubscribed.store(false, Ordering::SeqCst);
        Ok(Box::new(MockSubscription {
            unsubscribed: self.unsubscribed.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history_page;

    #[tokio::test]
    async fn scripted_pages_and_recorded_calls() {
        let store = MockStore::new();
        store.set_page(1, history_page("qa", 0, 3));
        store.fail_page(2, "timeout");
        let member = MemberId::new("qa");

        assert_eq!(store.fetch_page(&member, 1, 20).await.unwrap().len(), 3);
        assert!(store.fetch_page(&member, 2, 20).await.is_err());
        assert!(store.fetch_page(&member, 3, 20).await.unwrap().is_empty());
        assert_eq!(store.fetches().len(), 3);
    }

    #[tokio::test]
    async fn push_reaches_subscriber_until_unsubscribed() {
        let store = MockStore::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let sub = store
            .subscribe(
                &MemberId::new("qa"),
                Arc::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();

        assert!(store.push(history_page("qa", 0, 1).remove(0)));
        sub.unsubscribe();
        assert!(!store.push(history_page("qa", 1, 1).remove(0)));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}

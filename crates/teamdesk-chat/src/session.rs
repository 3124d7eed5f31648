// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat session state machine.
//!
//! State lives behind a short-held `std::sync::Mutex` that is never held
//! across an `.await`, so live pushes can be applied from the realtime task.
//! Every open starts a new generation; results that come back for an older
//! generation are dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use teamdesk_config::model::ChatConfig;
use teamdesk_core::{
    AiResponder, ChatMessage, ChatStore, InsertCallback, LogNotices, MemberId, MessageCache,
    NewChatMessage, NoticeSink, Subscription, TeamdeskError, cache_key,
};

use crate::timeline::Timeline;
use crate::view::{ChatState, ChatView};
use crate::{APOLOGY, NOTICE_HISTORY_FAILED, NOTICE_MORE_FAILED, NOTICE_SAVE_FAILED};

/// Failure classes surfaced by a chat session.
///
/// None of them is retried automatically.
#[derive(Debug, Error)]
pub enum ChatFailure {
    #[error("history fetch failed: {0}")]
    FetchFailed(#[source] TeamdeskError),

    #[error("AI request failed: {0}")]
    SendAiFailed(#[source] TeamdeskError),

    #[error("saving messages failed: {0}")]
    PersistFailed(#[source] TeamdeskError),

    #[error("live updates unavailable: {0}")]
    SubscriptionFailed(#[source] TeamdeskError),

    #[error("no conversation is open")]
    NotOpen,
}

#[derive(Debug)]
pub enum SendOutcome {
    /// Blank input; nothing was sent.
    Ignored,
    Replied,
    /// The AI request failed and the apology was appended.
    Apologized(ChatFailure),
    /// The reply arrived after the conversation was closed or reopened.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    /// A load was already running, or there is no older history.
    Skipped,
    Loaded { rows: usize },
}

/// What `close` managed to do.
#[derive(Debug, Default)]
pub struct CloseReport {
    /// Rows the store confirmed.
    pub saved: usize,
    pub failure: Option<ChatFailure>,
}

struct Inner {
    member: Option<MemberId>,
    generation: u64,
    state: ChatState,
    timeline: Timeline,
    has_more: bool,
    current_page: u32,
    generating: usize,
    last_notice: Option<String>,
    closed: bool,
    subscription: Option<Box<dyn Subscription>>,
}

impl Inner {
    fn snapshot(&self) -> ChatView {
        ChatView {
            member_id: self.member.clone(),
            messages: self.timeline.messages(),
            state: self.state,
            has_more: self.has_more,
            generating: self.generating,
            notice: self.last_notice.clone(),
            closed: self.closed,
        }
    }

    fn live(&self, generation: u64) -> bool {
        self.generation == generation && self.state.is_open()
    }

    fn loading_more(&self, generation: u64) -> bool {
        self.generation == generation && self.state == ChatState::LoadingMore
    }

    /// Records `text` as the current notice. False when it repeats the last one.
    fn note(&mut self, text: &str) -> bool {
        if self.last_notice.as_deref() == Some(text) {
            return false;
        }
        self.last_notice = Some(text.to_string());
        true
    }
}

struct Shared {
    inner: Mutex<Inner>,
    view: watch::Sender<ChatView>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Runs `f` under the lock, then publishes the view.
    fn update<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.lock();
        let out = f(&mut inner);
        self.view.send_replace(inner.snapshot());
        out
    }
}

/// View-model for one conversation with an AI team member.
#[derive(Clone)]
pub struct ChatSession {
    store: Arc<dyn ChatStore>,
    responder: Arc<dyn AiResponder>,
    cache: Arc<dyn MessageCache>,
    notices: Arc<dyn NoticeSink>,
    page_size: u32,
    shared: Arc<Shared>,
}

impl ChatSession {
    pub fn new(
        store: Arc<dyn ChatStore>,
        responder: Arc<dyn AiResponder>,
        cache: Arc<dyn MessageCache>,
        config: &ChatConfig,
    ) -> Self {
        let inner = Inner {
            member: None,
            generation: 0,
            state: ChatState::Idle,
            timeline: Timeline::new(),
            has_more: true,
            current_page: 1,
            generating: 0,
            last_notice: None,
            closed: false,
            subscription: None,
        };
        let (view, _) = watch::channel(inner.snapshot());
        Self {
            store,
            responder,
            cache,
            notices: Arc::new(LogNotices),
            page_size: config.page_size.max(1),
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                view,
            }),
        }
    }

    /// Routes notices somewhere other than the log.
    pub fn with_notices(mut self, notices: Arc<dyn NoticeSink>) -> Self {
        self.notices = notices;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Current snapshot.
    pub fn view(&self) -> ChatView {
        self.shared.view.borrow().clone()
    }

    /// Receiver notified after every change.
    pub fn watch(&self) -> watch::Receiver<ChatView> {
        self.shared.view.subscribe()
    }

    fn show(&self, text: &str, fresh: bool) {
        if fresh {
            self.notices.notify(text);
        }
    }

    fn full_page(&self, rows: usize) -> bool {
        rows == self.page_size as usize
    }

    /// Opens the conversation with `member_id`.
    ///
    /// Publishes the cached snapshot first when there is one, subscribes to
    /// live inserts, then replaces the persisted part of the view with page 1.
    /// A fetch failure keeps whatever is shown, raises a notice, and is
    /// returned; the session is `Ready` either way.
    pub async fn open(&self, member_id: MemberId) -> Result<(), ChatFailure> {
        let key = cache_key(&member_id);
        let (generation, previous) = self.shared.update(|inner| {
            inner.generation += 1;
            inner.member = Some(member_id.clone());
            inner.state = ChatState::LoadingHistory;
            inner.timeline.clear();
            inner.has_more = true;
            inner.current_page = 1;
            inner.generating = 0;
            inner.closed = false;
            (inner.generation, inner.subscription.take())
        });
        if let Some(previous) = previous {
            previous.unsubscribe();
        }
        info!(member = %member_id, generation, "opening chat");

        match self.cache.load(&key).await {
            Ok(Some(cached)) if !cached.is_empty() => {
                debug!(member = %member_id, rows = cached.len(), "showing cached history");
                self.shared.update(|inner| {
                    if inner.live(generation) {
                        inner.timeline.replace_persisted(cached);
                    }
                });
            }
            Ok(_) => {}
            Err(e) => warn!(key = %key, error = %e, "chat cache read failed"),
        }

        self.subscribe(&member_id, generation).await;

        match self.store.fetch_page(&member_id, 1, self.page_size).await {
            Ok(rows) => {
                let full = self.full_page(rows.len());
                let snapshot = rows.clone();
                let applied = self.shared.update(|inner| {
                    if !inner.live(generation) {
                        return false;
                    }
                    inner.timeline.replace_persisted(rows);
                    inner.has_more = full;
                    inner.current_page = 1;
                    inner.state = ChatState::Ready;
                    true
                });
                if applied {
                    if let Err(e) = self.cache.store(&key, &snapshot).await {
                        warn!(key = %key, error = %e, "chat cache write failed");
                    }
                } else {
                    debug!(member = %member_id, generation, "dropping stale history page");
                }
                Ok(())
            }
            Err(e) => {
                error!(member = %member_id, error = %e, "failed to load chat history");
                let fresh = self.shared.update(|inner| {
                    if !inner.live(generation) {
                        return false;
                    }
                    inner.state = ChatState::Ready;
                    inner.note(NOTICE_HISTORY_FAILED)
                });
                self.show(NOTICE_HISTORY_FAILED, fresh);
                Err(ChatFailure::FetchFailed(e))
            }
        }
    }

    async fn subscribe(&self, member_id: &MemberId, generation: u64) {
        let weak = Arc::downgrade(&self.shared);
        let member = member_id.clone();
        let on_insert: InsertCallback = Arc::new(move |message: ChatMessage| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            if message.team_member_id != member {
                return;
            }
            shared.update(|inner| {
                if inner.live(generation) {
                    let merge = inner.timeline.merge(message);
                    debug!(?merge, "live insert merged");
                }
            });
        });

        match self.store.subscribe(member_id, on_insert).await {
            Ok(subscription) => {
                let stale = {
                    let mut inner = self.shared.lock();
                    if inner.live(generation) {
                        inner.subscription = Some(subscription);
                        None
                    } else {
                        Some(subscription)
                    }
                };
                if let Some(stale) = stale {
                    stale.unsubscribe();
                }
            }
            Err(e) => {
                let failure = ChatFailure::SubscriptionFailed(e);
                error!(member = %member_id, error = %failure, "chat subscription failed");
            }
        }
    }

    /// Loads the next older page.
    ///
    /// Skipped while another load is running or once a short page has been
    /// seen. Older rows never touch the cache.
    pub async fn load_more(&self) -> Result<LoadMoreOutcome, ChatFailure> {
        let claim = self.shared.update(|inner| {
            if inner.state != ChatState::Ready || !inner.has_more {
                return None;
            }
            let member = inner.member.clone()?;
            inner.state = ChatState::LoadingMore;
            Some((member, inner.current_page + 1, inner.generation))
        });
        let Some((member, page, generation)) = claim else {
            debug!("load more skipped");
            return Ok(LoadMoreOutcome::Skipped);
        };

        match self.store.fetch_page(&member, page, self.page_size).await {
            Ok(rows) => {
                let count = rows.len();
                let full = self.full_page(count);
                self.shared.update(|inner| {
                    if inner.loading_more(generation) {
                        inner.timeline.merge_page(rows);
                        inner.has_more = full;
                        inner.current_page = page;
                        inner.state = ChatState::Ready;
                    }
                });
                debug!(member = %member, page, rows = count, "loaded older messages");
                Ok(LoadMoreOutcome::Loaded { rows: count })
            }
            Err(e) => {
                error!(member = %member, page, error = %e, "failed to load more messages");
                let fresh = self.shared.update(|inner| {
                    if !inner.loading_more(generation) {
                        return false;
                    }
                    inner.state = ChatState::Ready;
                    inner.note(NOTICE_MORE_FAILED)
                });
                self.show(NOTICE_MORE_FAILED, fresh);
                Err(ChatFailure::FetchFailed(e))
            }
        }
    }

    /// Refetches page 1 and replaces the persisted part of the view.
    ///
    /// A failure is shown with the store's own error text.
    pub async fn retry(&self) -> Result<(), ChatFailure> {
        let claim = self.shared.update(|inner| {
            if !inner.state.is_open() {
                return Err(ChatFailure::NotOpen);
            }
            if inner.state != ChatState::Ready {
                return Ok(None);
            }
            let member = inner.member.clone().ok_or(ChatFailure::NotOpen)?;
            inner.state = ChatState::LoadingHistory;
            Ok(Some((member, inner.generation)))
        })?;
        let Some((member, generation)) = claim else {
            debug!("retry skipped while loading");
            return Ok(());
        };

        match self.store.fetch_page(&member, 1, self.page_size).await {
            Ok(rows) => {
                let full = self.full_page(rows.len());
                self.shared.update(|inner| {
                    if inner.live(generation) {
                        inner.timeline.replace_persisted(rows);
                        inner.has_more = full;
                        inner.current_page = 1;
                        inner.state = ChatState::Ready;
                    }
                });
                Ok(())
            }
            Err(e) => {
                let text = e.to_string();
                error!(member = %member, error = %e, "retry failed");
                let fresh = self.shared.update(|inner| {
                    if !inner.live(generation) {
                        return false;
                    }
                    inner.state = ChatState::Ready;
                    inner.note(&text)
                });
                self.show(&text, fresh);
                Err(ChatFailure::FetchFailed(e))
            }
        }
    }

    /// Sends `text` to the AI team member.
    ///
    /// The trimmed text is shown at once as a pending message, then exactly
    /// one AI request is made. Its reply, or the apology on failure, is
    /// appended. AI failures raise no notice.
    pub async fn send(&self, text: &str) -> Result<SendOutcome, ChatFailure> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        let claim = self.shared.update(|inner| {
            if !inner.state.is_open() {
                return None;
            }
            let member = inner.member.clone()?;
            inner.timeline.push_local(ChatMessage::human(&member, trimmed));
            inner.generating += 1;
            Some((member, inner.generation))
        });
        let Some((member, generation)) = claim else {
            return Err(ChatFailure::NotOpen);
        };

        let (reply, outcome) = match self.responder.respond(trimmed).await {
            Ok(content) => (content, SendOutcome::Replied),
            Err(e) => {
                warn!(member = %member, kind = ?e.ai_kind(), error = %e, "AI reply failed");
                (
                    APOLOGY.to_string(),
                    SendOutcome::Apologized(ChatFailure::SendAiFailed(e)),
                )
            }
        };

        let applied = self.shared.update(|inner| {
            if !inner.live(generation) {
                return false;
            }
            inner.generating = inner.generating.saturating_sub(1);
            inner.timeline.push_local(ChatMessage::ai(&member, reply));
            true
        });
        if applied {
            Ok(outcome)
        } else {
            debug!(member = %member, generation, "reply arrived after close");
            Ok(SendOutcome::Discarded)
        }
    }

    /// Closes the conversation.
    ///
    /// Tears down the live subscription and saves the pending messages in one
    /// batch. On success the pending ids are swapped for the store's ids. The
    /// cache entry is removed whether or not saving worked, and the view is
    /// marked closed.
    pub async fn close(&self) -> Result<CloseReport, ChatFailure> {
        let claim = self.shared.update(|inner| {
            if !inner.state.is_open() {
                return None;
            }
            let member = inner.member.clone()?;
            inner.state = ChatState::Closing;
            Some((
                member,
                inner.generation,
                inner.subscription.take(),
                inner.timeline.pending(),
            ))
        });
        let Some((member, generation, subscription, pending)) = claim else {
            return Err(ChatFailure::NotOpen);
        };
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }

        let mut report = CloseReport::default();
        if !pending.is_empty() {
            let rows: Vec<NewChatMessage> = pending.iter().map(ChatMessage::to_new).collect();
            match self.store.insert_batch(rows).await {
                Ok(saved) => {
                    report.saved = saved.len();
                    self.shared.update(|inner| {
                        if inner.generation != generation {
                            return;
                        }
                        for (local, row) in pending.iter().zip(saved) {
                            inner.timeline.swap_id(&local.id, row.id);
                        }
                    });
                }
                Err(e) => {
                    error!(member = %member, error = %e, "failed to save messages");
                    let fresh = self.shared.update(|inner| {
                        inner.generation == generation && inner.note(NOTICE_SAVE_FAILED)
                    });
                    self.show(NOTICE_SAVE_FAILED, fresh);
                    report.failure = Some(ChatFailure::PersistFailed(e));
                }
            }
        }

        let key = cache_key(&member);
        if let Err(e) = self.cache.remove(&key).await {
            warn!(key = %key, error = %e, "chat cache removal failed");
        }

        self.shared.update(|inner| {
            if inner.generation == generation {
                inner.state = ChatState::Idle;
                inner.generating = 0;
                inner.closed = true;
            }
        });
        info!(member = %member, saved = report.saved, "chat closed");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inner() -> Inner {
        Inner {
            member: None,
            generation: 0,
            state: ChatState::Idle,
            timeline: Timeline::new(),
            has_more: true,
            current_page: 1,
            generating: 0,
            last_notice: None,
            closed: false,
            subscription: None,
        }
    }

    #[test]
    fn repeated_notice_is_suppressed() {
        let mut inner = inner();
        assert!(inner.note("Failed to load chat history"));
        assert!(!inner.note("Failed to load chat history"));
        assert!(inner.note("Failed to save messages"));
        assert!(inner.note("Failed to load chat history"));
    }

    #[test]
    fn stale_generation_is_not_live() {
        let mut inner = inner();
        inner.generation = 2;
        inner.state = ChatState::Ready;
        assert!(inner.live(2));
        assert!(!inner.live(1));
        inner.state = ChatState::Closing;
        assert!(!inner.live(2));
    }
}

// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered message list with id-based de-duplication.
//!
//! Entries are kept sorted by `(timestamp, arrival)`. Arrival is a counter
//! assigned on first insertion and kept across replacements, so messages
//! with equal timestamps stay in the order they were first seen.
//!
//! Identity is the message id alone. A pending message only takes a server
//! id through [`Timeline::swap_id`] after this session saved it.

use teamdesk_core::{ChatMessage, MessageId};

/// Where an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Created in this session and not yet saved.
    Local,
    /// Cached snapshot or fetched history page.
    Page,
    /// Live insert from the subscription.
    Push,
}

#[derive(Debug, Clone)]
struct Entry {
    arrival: u64,
    origin: Origin,
    message: ChatMessage,
}

/// Result of merging one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    Inserted,
    /// An entry with the same id was replaced.
    Replaced,
}

#[derive(Debug, Default)]
pub struct Timeline {
    entries: Vec<Entry>,
    next_arrival: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Messages in display order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.entries.iter().map(|e| e.message.clone()).collect()
    }

    /// Pending messages in display order.
    pub fn pending(&self) -> Vec<ChatMessage> {
        self.entries
            .iter()
            .filter(|e| e.message.id.is_pending())
            .map(|e| e.message.clone())
            .collect()
    }

    fn place(&mut self, entry: Entry) {
        let key = (entry.message.timestamp, entry.arrival);
        let at = self
            .entries
            .partition_point(|e| (e.message.timestamp, e.arrival) <= key);
        self.entries.insert(at, entry);
    }

    /// Appends a locally created message.
    pub fn push_local(&mut self, message: ChatMessage) {
        let arrival = self.bump();
        self.place(Entry {
            arrival,
            origin: Origin::Local,
            message,
        });
    }

    fn bump(&mut self) -> u64 {
        let arrival = self.next_arrival;
        self.next_arrival += 1;
        arrival
    }

    fn merge_from(&mut self, message: ChatMessage, origin: Origin) -> Merge {
        if let Some(pos) = self.entries.iter().position(|e| e.message.id == message.id) {
            let old = self.entries.remove(pos);
            self.place(Entry {
                arrival: old.arrival,
                origin,
                message,
            });
            return Merge::Replaced;
        }

        let arrival = self.bump();
        self.place(Entry {
            arrival,
            origin,
            message,
        });
        Merge::Inserted
    }

    /// Merges a live insert.
    pub fn merge(&mut self, message: ChatMessage) -> Merge {
        self.merge_from(message, Origin::Push)
    }

    /// Merges a page the store returned newest first.
    pub fn merge_page(&mut self, rows: Vec<ChatMessage>) {
        for row in rows.into_iter().rev() {
            self.merge_from(row, Origin::Page);
        }
    }

    /// Drops the entries that came from earlier pages, then merges `rows`.
    ///
    /// Local and pushed entries stay; a pushed row that is also in `rows` is
    /// replaced in place.
    pub fn replace_persisted(&mut self, rows: Vec<ChatMessage>) {
        self.entries.retain(|e| e.origin != Origin::Page);
        self.merge_page(rows);
    }

    /// Gives the entry holding `from` the id `to`.
    pub fn swap_id(&mut self, from: &MessageId, to: MessageId) -> bool {
        match self.entries.iter_mut().find(|e| &e.message.id == from) {
            Some(entry) => {
                entry.message.id = to;
                entry.origin = Origin::Page;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teamdesk_core::{MemberId, MessageKind, Sender};
    use teamdesk_test_utils::{at_minute, history_page, persisted};

    fn ids(timeline: &Timeline) -> Vec<String> {
        timeline
            .messages()
            .iter()
            .map(|m| m.id.to_string())
            .collect()
    }

    #[test]
    fn pages_display_oldest_first() {
        let mut timeline = Timeline::new();
        timeline.merge_page(history_page("qa", 0, 3));
        assert_eq!(ids(&timeline), vec!["row-0", "row-1", "row-2"]);

        timeline.merge_page(history_page("qa", 3, 2));
        timeline.merge_page(history_page("qa", 0, 3));
        assert_eq!(timeline.len(), 5);
        assert_eq!(ids(&timeline).last().unwrap(), "row-4");
    }

    #[test]
    fn older_page_lands_in_front() {
        let mut timeline = Timeline::new();
        timeline.merge_page(history_page("qa", 10, 2));
        timeline.merge_page(history_page("qa", 8, 2));
        assert_eq!(ids(&timeline), vec!["row-8", "row-9", "row-10", "row-11"]);
    }

    #[test]
    fn equal_timestamps_keep_arrival_order() {
        let mut timeline = Timeline::new();
        timeline.merge(persisted("qa", "b", MessageKind::Human, "first", 5));
        timeline.merge(persisted("qa", "a", MessageKind::Ai, "second", 5));
        assert_eq!(ids(&timeline), vec!["b", "a"]);
    }

    #[test]
    fn same_id_replaces_in_place() {
        let mut timeline = Timeline::new();
        timeline.merge(persisted("qa", "x", MessageKind::Ai, "draft", 1));
        let merge = timeline.merge(persisted("qa", "x", MessageKind::Ai, "final", 1));
        assert_eq!(merge, Merge::Replaced);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.messages()[0].content, "final");
    }

    #[test]
    fn same_content_push_does_not_adopt_pending_message() {
        let member = MemberId::new("qa");
        let mut timeline = Timeline::new();
        let mut local = ChatMessage::human(&member, "yes");
        local.timestamp = at_minute(10);
        timeline.push_local(local);

        let mut other_tab = persisted("qa", "srv-9", MessageKind::Human, "yes", 10);
        other_tab.sender = Sender::User;
        assert_eq!(timeline.merge(other_tab), Merge::Inserted);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.pending().len(), 1);
        assert_eq!(timeline.pending()[0].content, "yes");
    }

    #[test]
    fn replace_persisted_keeps_pushed_rows() {
        let mut timeline = Timeline::new();
        timeline.merge_page(history_page("qa", 0, 2));
        timeline.merge(persisted("qa", "live-1", MessageKind::Ai, "pushed", 50));
        timeline.merge(persisted("qa", "row-3", MessageKind::Ai, "pushed too", 3));

        timeline.replace_persisted(history_page("qa", 2, 2));
        assert_eq!(ids(&timeline), vec!["row-2", "row-3", "live-1"]);
    }

    #[test]
    fn replace_persisted_keeps_pending() {
        let member = MemberId::new("qa");
        let mut timeline = Timeline::new();
        timeline.merge_page(history_page("qa", 0, 3));
        timeline.push_local(ChatMessage::human(&member, "unsent"));

        timeline.replace_persisted(history_page("qa", 1, 1));
        assert_eq!(timeline.len(), 2);
        assert_eq!(ids(&timeline)[0], "row-1");
        assert!(timeline.messages()[1].id.is_pending());
    }

    #[test]
    fn swap_id_targets_one_entry() {
        let member = MemberId::new("qa");
        let mut timeline = Timeline::new();
        let local = ChatMessage::ai(&member, "reply");
        let pending = local.id.clone();
        timeline.push_local(local);

        assert!(timeline.swap_id(&pending, MessageId::Persisted("srv-1".into())));
        assert!(!timeline.swap_id(&pending, MessageId::Persisted("srv-2".into())));
        assert_eq!(ids(&timeline), vec!["srv-1"]);
    }
}

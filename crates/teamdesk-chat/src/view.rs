// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use strum::Display;

use teamdesk_core::{ChatMessage, MemberId};

/// Lifecycle of a chat session.
///
/// `Idle -> LoadingHistory -> Ready`, `Ready <-> LoadingMore`,
/// `Ready -> Closing -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ChatState {
    #[default]
    Idle,
    LoadingHistory,
    Ready,
    LoadingMore,
    Closing,
}

impl ChatState {
    /// True while a conversation is open.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            ChatState::LoadingHistory | ChatState::Ready | ChatState::LoadingMore
        )
    }
}

/// Snapshot published to observers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatView {
    pub member_id: Option<MemberId>,
    /// Display order: timestamp ascending.
    pub messages: Vec<ChatMessage>,
    pub state: ChatState,
    pub has_more: bool,
    /// AI requests in flight.
    pub generating: usize,
    /// Last notice shown to the user.
    pub notice: Option<String>,
    /// Set once `close` has finished.
    pub closed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_loading_and_ready_states_are_open() {
        assert!(ChatState::Ready.is_open());
        assert!(ChatState::LoadingMore.is_open());
        assert!(!ChatState::Idle.is_open());
        assert!(!ChatState::Closing.is_open());
        assert_eq!(ChatState::LoadingHistory.to_string(), "loading_history");
    }
}

// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Teamdesk.
//!
//! Provides the chat message model, directory entities, role ordering, the
//! shared error type, and the adapter traits implemented by the remote store,
//! AI responders, and the local cache.

pub mod access;
pub mod directory;
pub mod error;
pub mod roster;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use access::{UserRole, has_permission, require_role};
pub use error::{AiErrorKind, TeamdeskError};
pub use types::{
    AdapterType, ChatMessage, HealthStatus, MemberId, MessageId, MessageKind, NewChatMessage,
    Sender,
};

pub use traits::{
    AiResponder, ChatStore, DirectoryStore, InsertCallback, LogNotices, MessageCache, NoticeSink,
    PluginAdapter, ProjectStore, Subscription, cache_key,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_adapter_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_chat_store<T: ChatStore>() {}
        fn _assert_responder<T: AiResponder>() {}
        fn _assert_cache<T: MessageCache>() {}
        fn _assert_directory<T: DirectoryStore>() {}
        fn _assert_projects<T: ProjectStore>() {}
    }

    #[test]
    fn cache_key_is_prefixed_member_id() {
        assert_eq!(cache_key(&MemberId::new("qa-tester")), "chat_qa-tester");
    }

    #[test]
    fn adapter_type_round_trips_through_display() {
        use std::str::FromStr;

        for variant in [AdapterType::Store, AdapterType::Responder, AdapterType::Cache] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }
}

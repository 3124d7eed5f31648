// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod cache;
pub mod directory;
pub mod notice;
pub mod responder;
pub mod store;

pub use adapter::PluginAdapter;
pub use cache::{MessageCache, cache_key};
pub use directory::{DirectoryStore, ProjectStore};
pub use notice::{LogNotices, NoticeSink};
pub use responder::AiResponder;
pub use store::{ChatStore, InsertCallback, Subscription};

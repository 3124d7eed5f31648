// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat view-model for Teamdesk.
//!
//! [`ChatSession`] owns one conversation with an AI team member. It combines
//! a cache-first read, paged history, optimistic local messages, live pushes,
//! and AI replies into one ordered list, published as a [`ChatView`] on a
//! `watch` channel after every change.

pub mod session;
pub mod timeline;
pub mod view;

pub use session::{ChatFailure, ChatSession, CloseReport, LoadMoreOutcome, SendOutcome};
pub use view::{ChatState, ChatView};

/// Reply appended when the AI request fails.
pub const APOLOGY: &str =
    "I apologize, but I encountered an error while processing your message. Please try again.";

pub const NOTICE_HISTORY_FAILED: &str = "Failed to load chat history";
pub const NOTICE_MORE_FAILED: &str = "Failed to load more messages";
pub const NOTICE_SAVE_FAILED: &str = "Failed to save messages";

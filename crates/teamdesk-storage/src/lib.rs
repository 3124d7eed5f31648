// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Teamdesk's local conversation cache.
//!
//! A single-writer connection via `tokio-rusqlite`, embedded refinery
//! migrations, and a key/value table holding JSON snapshots of each
//! conversation's first page.

pub mod cache;
pub mod database;
pub mod migrations;
pub mod queries;

pub use cache::SqliteMessageCache;
pub use database::Database;

// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI relay server for Teamdesk.
//!
//! Browser clients cannot hold the generative API key, so they POST
//! `{"message": ...}` here and receive `{"content": ...}` or `{"error": ...}`.
//! CORS is fully open and preflight requests are answered by the CORS layer.

pub mod handlers;
pub mod server;

pub use server::{RelayState, router, start_server};

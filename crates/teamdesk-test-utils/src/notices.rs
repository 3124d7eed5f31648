// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notice sink that records what the user would have seen.

use std::sync::{Arc, Mutex};

use teamdesk_core::NoticeSink;

#[derive(Debug, Clone, Default)]
pub struct RecordingNotices {
    shown: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notice shown, in order.
    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl NoticeSink for RecordingNotices {
    fn notify(&self, text: &str) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(text.to_string());
        }
    }
}

// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Where user-facing notices go.

/// Shows a short transient message to the user (a toast, a status line).
pub trait NoticeSink: Send + Sync {
    fn notify(&self, text: &str);
}

/// Notices as `warn`-level log events only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotices;

impl NoticeSink for LogNotices {
    fn notify(&self, text: &str) {
        tracing::warn!(notice = text, "notice");
    }
}

// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock AI responder with pre-configured replies.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, watch};

use teamdesk_core::{
    AdapterType, AiErrorKind, AiResponder, HealthStatus, PluginAdapter, TeamdeskError,
};

/// Replies are popped from a FIFO queue; an empty queue answers
/// `"mock response"`. Every prompt is recorded.
#[derive(Clone)]
pub struct MockResponder {
    replies: Arc<Mutex<VecDeque<Result<String, AiErrorKind>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    gate: Arc<watch::Sender<bool>>,
}

impl MockResponder {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            gate: Arc::new(gate),
        }
    }

    pub fn with_replies(replies: Vec<&str>) -> Self {
        let responder = Self::new();
        if let Ok(mut queue) = responder.replies.try_lock() {
            queue.extend(replies.into_iter().map(|r| Ok(r.to_string())));
        }
        responder
    }

    /// A responder whose every call fails with `kind`.
    pub fn failing(kind: AiErrorKind) -> Self {
        let responder = Self::new();
        if let Ok(mut queue) = responder.replies.try_lock() {
            queue.extend(std::iter::repeat_n(Err(kind), 64));
        }
        responder
    }

    pub async fn push_reply(&self, text: &str) {
        self.replies.lock().await.push_back(Ok(text.to_string()));
    }

    pub async fn push_failure(&self, kind: AiErrorKind) {
        self.replies.lock().await.push_back(Err(kind));
    }

    /// Make calls wait until [`MockResponder::release`].
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub async fn calls(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockResponder {
    fn name(&self) -> &str {
        "mock-responder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Responder
    }

    async fn health_check(&self) -> Result<HealthStatus, TeamdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TeamdeskError> {
        Ok(())
    }
}

#[async_trait]
impl AiResponder for MockResponder {
    async fn respond(&self, prompt: &str) -> Result<String, TeamdeskError> {
        self.prompts.lock().await.push(prompt.to_string());
        let reply = self.replies.lock().await.pop_front();

        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        match reply {
            Some(Ok(text)) => Ok(text),
            Some(Err(kind)) => Err(TeamdeskError::provider(kind, format!("mock {kind}"))),
            None => Ok("mock response".to_string()),
        }
    }
}

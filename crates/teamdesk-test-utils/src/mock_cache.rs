// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Map-backed [`MessageCache`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use teamdesk_core::{
    AdapterType, ChatMessage, HealthStatus, MessageCache, PluginAdapter, TeamdeskError,
};

#[derive(Default)]
struct State {
    entries: HashMap<String, Vec<ChatMessage>>,
    removed: Vec<String>,
    stores: usize,
}

#[derive(Clone, Default)]
pub struct InMemoryCache {
    state: Arc<Mutex<State>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Seed an entry without counting it as a store.
    pub fn seed(&self, key: &str, messages: Vec<ChatMessage>) {
        self.state().entries.insert(key.to_string(), messages);
    }

    pub fn get(&self, key: &str) -> Option<Vec<ChatMessage>> {
        self.state().entries.get(key).cloned()
    }

    /// Keys removed, in order.
    pub fn removed(&self) -> Vec<String> {
        self.state().removed.clone()
    }

    pub fn store_count(&self) -> usize {
        self.state().stores
    }
}

#[async_trait]
impl PluginAdapter for InMemoryCache {
    fn name(&self) -> &str {
        "memory-cache"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Cache
    }

    async fn health_check(&self) -> Result<HealthStatus, TeamdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TeamdeskError> {
        Ok(())
    }
}

#[async_trait]
impl MessageCache for InMemoryCache {
    async fn load(&self, key: &str) -> Result<Option<Vec<ChatMessage>>, TeamdeskError> {
        Ok(self.get(key))
    }

    async fn store(&self, key: &str, messages: &[ChatMessage]) -> Result<(), TeamdeskError> {
        let mut state = self.state();
        state.entries.insert(key.to_string(), messages.to_vec());
        state.stores += 1;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), TeamdeskError> {
        let mut state = self.state();
        state.entries.remove(key);
        state.removed.push(key.to_string());
        Ok(())
    }
}

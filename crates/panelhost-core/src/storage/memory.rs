use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::storage::error::StorageSystemError;
use crate::storage::provider::{UserPluginState, UserPluginStore};

#[derive(Debug, Default)]
struct MemoryState {
    /// token -> that user's plugin entries
    users: HashMap<String, Vec<UserPluginState>>,
    fail_next: Option<String>,
}

/// In-process store keyed by session token, for development and tests.
///
/// Toggling or configuring a plugin the user has no entry for provisions one,
/// mirroring the backend's upsert behaviour.
#[derive(Debug, Default)]
pub struct InMemoryPluginStore {
    state: Mutex<MemoryState>,
    latency: Option<Duration>,
    fetches: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryPluginStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call, to exercise in-flight behaviour
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create (or reset) a user's entries
    pub fn seed(&self, token: &str, plugins: Vec<UserPluginState>) {
        self.lock().users.insert(token.to_string(), plugins);
    }

    pub fn snapshot(&self, token: &str) -> Vec<UserPluginState> {
        self.lock().users.get(token).cloned().unwrap_or_default()
    }

    /// Make the next call fail with `message`
    pub fn fail_next(&self, message: &str) {
        self.lock().fail_next = Some(message.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn before_call(&self, operation: &str) -> Result<(), StorageSystemError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let injected = self.lock().fail_next.take();
        match injected {
            Some(message) => Err(StorageSystemError::OperationFailed {
                operation: operation.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }

    fn upsert<F>(&self, token: &str, plugin_name: &str, apply: F) -> Result<UserPluginState, StorageSystemError>
    where
        F: FnOnce(&mut UserPluginState),
    {
        let mut state = self.lock();
        let entries = state.users.get_mut(token).ok_or(StorageSystemError::Unauthorized)?;
        let index = match entries.iter().position(|p| p.plugin_name == plugin_name) {
            Some(index) => index,
            None => {
                entries.push(UserPluginState::new(plugin_name, false));
                entries.len() - 1
            }
        };
        apply(&mut entries[index]);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(entries[index].clone())
    }
}

#[async_trait]
impl UserPluginStore for InMemoryPluginStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_user_plugins(&self, token: &str) -> Result<Vec<UserPluginState>, StorageSystemError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.before_call("fetch_user_plugins").await?;
        self.lock().users.get(token).cloned().ok_or(StorageSystemError::Unauthorized)
    }

    async fn set_enabled(&self, token: &str, plugin_name: &str, enabled: bool) -> Result<UserPluginState, StorageSystemError> {
        self.before_call(if enabled { "enable" } else { "disable" }).await?;
        self.upsert(token, plugin_name, |entry| entry.enabled = enabled)
    }

    async fn update_config(
        &self,
        token: &str,
        plugin_name: &str,
        config: &HashMap<String, String>,
    ) -> Result<UserPluginState, StorageSystemError> {
        self.before_call("update_config").await?;
        self.upsert(token, plugin_name, |entry| entry.config = config.clone())
    }
}

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::event::PluginEvent;
use crate::plugin_system::{PluginDefinition, PluginRegistry};
use crate::provider::context::PluginContext;
use crate::provider::error::ProviderError;
use crate::storage::{HostConfig, UserPluginState, UserPluginStore};
use crate::utils::merge_config;

#[derive(Debug, Default)]
struct ProviderState {
    user_plugins: Vec<UserPluginState>,
    loading: bool,
    error: Option<String>,
}

struct ProviderInner {
    registry: Arc<PluginRegistry>,
    store: Arc<dyn UserPluginStore>,
    config: HostConfig,
    http: reqwest::Client,
    token: RwLock<Option<String>>,
    state: RwLock<ProviderState>,
    /// Sequence number of the most recently started refresh
    refresh_seq: AtomicU64,
    detached: AtomicBool,
}

/// Per-session bridge between the stateless [`PluginRegistry`] and the
/// user's server-held plugin state.
///
/// Cloning is cheap and yields a handle onto the same session.
#[derive(Clone)]
pub struct PluginProvider {
    inner: Arc<ProviderInner>,
}

impl fmt::Debug for PluginProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("PluginProvider")
            .field("store", &self.inner.store.name())
            .field("authenticated", &self.token().is_some())
            .field("user_plugins", &state.user_plugins.len())
            .field("loading", &state.loading)
            .field("error", &state.error)
            .field("detached", &self.is_detached())
            .finish()
    }
}

impl PluginProvider {
    /// Create a provider for the session described by `config.token`.
    pub fn new(
        registry: Arc<PluginRegistry>,
        store: Arc<dyn UserPluginStore>,
        config: HostConfig,
    ) -> Result<Self, ProviderError> {
        let http = config.http_client()?;
        let token = config.token.clone();
        Ok(Self {
            inner: Arc::new(ProviderInner {
                registry,
                store,
                config,
                http,
                token: RwLock::new(token),
                state: RwLock::new(ProviderState::default()),
                refresh_seq: AtomicU64::new(0),
                detached: AtomicBool::new(false),
            }),
        })
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ProviderState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ProviderState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.inner.registry
    }

    pub fn config(&self) -> &HostConfig {
        &self.inner.config
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub fn token(&self) -> Option<String> {
        self.inner.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Log in or out. Changing identity drops the previous user's state.
    pub fn set_token(&self, token: Option<String>) {
        let mut current = self.inner.token.write().unwrap_or_else(PoisonError::into_inner);
        if *current == token {
            return;
        }
        *current = token;
        drop(current);
        // Invalidate any refresh still in flight for the old identity.
        self.inner.refresh_seq.fetch_add(1, Ordering::SeqCst);
        *self.write_state() = ProviderState::default();
    }

    fn require_token(&self) -> Result<String, ProviderError> {
        self.token().ok_or(ProviderError::NotAuthenticated)
    }

    /// Stop applying results. Fetches already in flight complete but are discarded.
    pub fn detach(&self) {
        self.inner.detached.store(true, Ordering::SeqCst);
    }

    pub fn is_detached(&self) -> bool {
        self.inner.detached.load(Ordering::SeqCst)
    }

    /// Raw per-user entries from the last successful refresh
    pub fn user_plugins(&self) -> Vec<UserPluginState> {
        self.read_state().user_plugins.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().loading
    }

    /// Human-readable message from the last failed refresh
    pub fn error(&self) -> Option<String> {
        self.read_state().error.clone()
    }

    /// Definitions whose name is enabled in the user's state
    pub fn enabled_plugins(&self) -> Vec<Arc<PluginDefinition>> {
        let enabled: Vec<String> = self
            .read_state()
            .user_plugins
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.plugin_name.clone())
            .collect();
        self.inner.registry.get_by_names(&enabled)
    }

    /// Every registered definition paired with whether this user has it enabled
    pub fn available_plugins(&self) -> Vec<(Arc<PluginDefinition>, bool)> {
        self.inner
            .registry
            .get_all()
            .into_iter()
            .map(|d| {
                let enabled = self.is_plugin_enabled(&d.name);
                (d, enabled)
            })
            .collect()
    }

    /// Re-fetch the user's plugin list.
    ///
    /// Failures are recorded on [`error`](Self::error) and keep the previously
    /// loaded list. Results are dropped if the provider was detached, the
    /// token changed, or a newer refresh started while this one was in flight.
    pub async fn refresh_plugins(&self) {
        let Some(token) = self.token() else {
            log::debug!("Skipping plugin refresh: not authenticated");
            return;
        };
        if self.is_detached() {
            return;
        }

        let seq = self.inner.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.write_state().loading = true;

        let result = self.inner.store.fetch_user_plugins(&token).await;

        if self.is_detached() {
            log::debug!("Discarding plugin refresh result: provider detached");
            return;
        }
        if self.inner.refresh_seq.load(Ordering::SeqCst) != seq || self.token().as_deref() != Some(token.as_str()) {
            log::debug!("Discarding superseded plugin refresh #{}", seq);
            return;
        }

        let mut state = self.write_state();
        state.loading = false;
        match result {
            Ok(user_plugins) => {
                log::debug!("Loaded {} user plugin entries", user_plugins.len());
                state.user_plugins = user_plugins;
                state.error = None;
            }
            Err(e) => {
                log::error!("Failed to load plugins: {}", e);
                state.error = Some(format!("Failed to load plugins: {}", e));
            }
        }
    }

    /// Current config of a plugin; empty when the user has no entry for it.
    pub fn get_plugin_config(&self, name: &str) -> HashMap<String, String> {
        self.read_state()
            .user_plugins
            .iter()
            .find(|p| p.plugin_name == name)
            .map(|p| p.config.clone())
            .unwrap_or_default()
    }

    /// Shallow-merge `partial` over the current config, persist it, emit
    /// `plugin:config-updated` with the merged config, then refresh.
    pub async fn update_plugin_config(
        &self,
        name: &str,
        partial: HashMap<String, String>,
    ) -> Result<HashMap<String, String>, ProviderError> {
        let token = self.require_token()?;
        let merged = merge_config(&self.get_plugin_config(name), &partial);
        let written = self.inner.store.update_config(&token, name, &merged).await?;
        log::info!("Updated config for plugin '{}'", name);

        self.inner.registry.emit(&PluginEvent::config_updated(name, &merged));
        self.apply_written(&token, written);
        self.refresh_plugins().await;
        Ok(merged)
    }

    pub async fn enable_plugin(&self, name: &str) -> Result<(), ProviderError> {
        self.set_enabled(name, true).await
    }

    pub async fn disable_plugin(&self, name: &str) -> Result<(), ProviderError> {
        self.set_enabled(name, false).await
    }

    async fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), ProviderError> {
        let token = self.require_token()?;
        let written = self.inner.store.set_enabled(&token, name, enabled).await?;
        log::info!("Plugin '{}' {}", name, if enabled { "enabled" } else { "disabled" });

        let event = if enabled { PluginEvent::enabled(name) } else { PluginEvent::disabled(name) };
        self.inner.registry.emit(&event);
        self.apply_written(&token, written);
        self.refresh_plugins().await;
        Ok(())
    }

    /// Fold an entry the store just wrote into the cached list, so a failed
    /// refresh afterwards still leaves the write visible.
    fn apply_written(&self, token: &str, entry: UserPluginState) {
        if self.is_detached() || self.token().as_deref() != Some(token) {
            return;
        }
        let mut state = self.write_state();
        match state.user_plugins.iter_mut().find(|p| p.plugin_name == entry.plugin_name) {
            Some(slot) => *slot = entry,
            None => state.user_plugins.push(entry),
        }
    }

    /// True only for a name present in the user's state with `enabled` set.
    pub fn is_plugin_enabled(&self, name: &str) -> bool {
        if self.token().is_none() {
            return false;
        }
        self.read_state()
            .user_plugins
            .iter()
            .any(|p| p.plugin_name == name && p.enabled)
    }

    /// Build the capability object for a plugin instance
    pub fn create_plugin_context(&self, name: &str) -> PluginContext {
        PluginContext::new(name, self.get_plugin_config(name), self.token(), self.clone())
    }
}

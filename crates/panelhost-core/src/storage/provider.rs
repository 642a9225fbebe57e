use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::storage::error::StorageSystemError;

/// Server-held state of one plugin for one user.
///
/// `plugin_name` is a join key into the registry but is not checked against
/// it; the backend may know plugins this host has no definition for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPluginState {
    pub plugin_name: String,
    pub enabled: bool,
    #[serde(default)]
    pub config: HashMap<String, String>,
    #[serde(default)]
    pub is_core: bool,
}

impl UserPluginState {
    pub fn new(plugin_name: &str, enabled: bool) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            enabled,
            config: HashMap::new(),
            is_core: false,
        }
    }

    pub fn with_config<I, K, V>(mut self, config: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.config = config.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    pub fn core(mut self) -> Self {
        self.is_core = true;
        self
    }
}

/// Contract of the external per-user enablement store.
///
/// Every call is authenticated with the session token. Implementations do
/// not retry.
#[async_trait]
pub trait UserPluginStore: Send + Sync + Debug {
    /// Get the name of this store
    fn name(&self) -> &str;

    /// Authoritative list of the user's plugin entries
    async fn fetch_user_plugins(&self, token: &str) -> Result<Vec<UserPluginState>, StorageSystemError>;

    /// Toggle a plugin and return the updated entry
    async fn set_enabled(&self, token: &str, plugin_name: &str, enabled: bool) -> Result<UserPluginState, StorageSystemError>;

    /// Replace a plugin's config and return the updated entry
    async fn update_config(
        &self,
        token: &str,
        plugin_name: &str,
        config: &HashMap<String, String>,
    ) -> Result<UserPluginState, StorageSystemError>;
}

//! Backend-held enablement store over HTTP.
//!
//! Endpoints, all bearer-authenticated:
//!
//! - `GET    {base}/user-plugins/`
//! - `PATCH  {base}/user-plugins/{name}/enable` and `/disable`
//! - `PUT    {base}/user-plugins/{name}/config` with body `{"config": {...}}`
use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::kernel::constants::USER_PLUGINS_PATH;
use crate::plugin_system::validate_plugin_name;
use crate::storage::config::HostConfig;
use crate::storage::error::StorageSystemError;
use crate::storage::provider::{UserPluginState, UserPluginStore};

#[derive(Debug, Serialize)]
struct ConfigUpdateBody<'a> {
    config: &'a HashMap<String, String>,
}

/// [`UserPluginStore`] backed by the dashboard's REST API
#[derive(Debug, Clone)]
pub struct HttpPluginStore {
    client: reqwest::Client,
    config: HostConfig,
}

impl HttpPluginStore {
    pub fn new(config: &HostConfig) -> Result<Self, StorageSystemError> {
        config.validate()?;
        Ok(Self {
            client: config.http_client()?,
            config: config.clone(),
        })
    }

    /// Reuse an existing client, e.g. one shared with plugin API calls
    pub fn with_client(client: reqwest::Client, config: &HostConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    fn url(&self, suffix: &str) -> String {
        self.config.api_url(&format!("{}/{}", USER_PLUGINS_PATH, suffix))
    }

    /// URL of `action` on one plugin. The name becomes a path segment, so it
    /// must be a valid plugin name.
    fn plugin_url(&self, plugin_name: &str, action: &str) -> Result<String, StorageSystemError> {
        validate_plugin_name(plugin_name).map_err(|source| StorageSystemError::InvalidPluginName {
            plugin: plugin_name.to_string(),
            source,
        })?;
        Ok(self.url(&format!("{}/{}", plugin_name, action)))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
        token: &str,
    ) -> Result<T, StorageSystemError> {
        let response = request
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| StorageSystemError::transport(operation, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StorageSystemError::transport(operation, e))?;

        if !status.is_success() {
            log::warn!("Backend rejected '{}' with status {}", operation, status);
            return Err(StorageSystemError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body: error_detail(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| StorageSystemError::decode("json", e))
    }
}

/// Prefer the backend's `detail` message over the raw body
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl UserPluginStore for HttpPluginStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_user_plugins(&self, token: &str) -> Result<Vec<UserPluginState>, StorageSystemError> {
        let request = self.client.get(self.url(""));
        self.send("fetch_user_plugins", request, token).await
    }

    async fn set_enabled(&self, token: &str, plugin_name: &str, enabled: bool) -> Result<UserPluginState, StorageSystemError> {
        let action = if enabled { "enable" } else { "disable" };
        let request = self.client.patch(self.plugin_url(plugin_name, action)?);
        self.send(action, request, token).await
    }

    async fn update_config(
        &self,
        token: &str,
        plugin_name: &str,
        config: &HashMap<String, String>,
    ) -> Result<UserPluginState, StorageSystemError> {
        let url = self.plugin_url(plugin_name, "config")?;
        let body = serde_json::to_string(&ConfigUpdateBody { config }).map_err(|e| StorageSystemError::OperationFailed {
            operation: "update_config".to_string(),
            message: format!("failed to encode config: {}", e),
        })?;
        let request = self.client.put(url).body(body);
        self.send("update_config", request, token).await
    }
}

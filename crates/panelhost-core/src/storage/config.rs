use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::kernel::constants::{DEFAULT_API_BASE_URL, DEFAULT_PLUGIN_API_NAMESPACE, ENV_API_URL, ENV_TOKEN};
use crate::storage::error::StorageSystemError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Settings the dashboard host needs to reach its backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Backend base URL, e.g. `https://dash.example.com/api`
    pub api_base_url: String,
    /// Path segment plugin-relative API calls are namespaced under
    pub plugin_api_namespace: String,
    /// Per-request timeout; none by default
    pub request_timeout_secs: Option<u64>,
    /// Session token, usually supplied through the environment
    pub token: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            plugin_api_namespace: DEFAULT_PLUGIN_API_NAMESPACE.to_string(),
            request_timeout_secs: None,
            token: None,
        }
    }
}

impl HostConfig {
    /// Load from a file; the format follows the extension.
    pub fn load(path: &Path) -> Result<Self, StorageSystemError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.display().to_string()))?;
        let data = std::fs::read_to_string(path)
            .map_err(|e| StorageSystemError::io(e, "read_host_config", path.to_path_buf()))?;
        let config = Self::parse(&data, format)?;
        log::debug!("Loaded host config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration text in the given format
    pub fn parse(data: &str, format: ConfigFormat) -> Result<Self, StorageSystemError> {
        let config: HostConfig = match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| StorageSystemError::decode("json", e))?,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| StorageSystemError::decode("yaml", e))?,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| StorageSystemError::decode("toml", e))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply `PANELHOST_API_URL` / `PANELHOST_TOKEN` from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides through an arbitrary lookup (the environment in production)
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.token = Some(token);
        }
        self
    }

    pub fn validate(&self) -> Result<(), StorageSystemError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(StorageSystemError::InvalidConfig(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            )));
        }
        if self.plugin_api_namespace.trim_matches('/').is_empty() {
            return Err(StorageSystemError::InvalidConfig("plugin_api_namespace must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Join a backend path onto the base URL
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Build the shared HTTP client honouring the configured timeout
    pub fn http_client(&self) -> Result<reqwest::Client, StorageSystemError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(|e| StorageSystemError::transport("build_http_client", e))
    }
}

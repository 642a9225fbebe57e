use std::collections::HashMap;
use std::fmt;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::provider::error::ProviderError;
use crate::provider::manager::PluginProvider;

/// Options for [`PluginContext::call_api`]
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub body: Option<Value>,
    /// Extra headers; `Authorization` and `Content-Type` are always set by the host
    pub headers: Vec<(String, String)>,
}

impl Default for ApiRequest {
    fn default() -> Self {
        Self::get()
    }
}

impl ApiRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn post(body: Value) -> Self {
        Self::new(Method::POST).body(body)
    }

    pub fn put(body: Value) -> Self {
        Self::new(Method::PUT).body(body)
    }

    pub fn patch(body: Value) -> Self {
        Self::new(Method::PATCH).body(body)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Capability object handed to a plugin instance at mount time.
///
/// Carries a snapshot of the plugin's config, the raw session token, and
/// helpers bound to this plugin's name.
#[derive(Clone)]
pub struct PluginContext {
    plugin_name: String,
    config: HashMap<String, String>,
    token: Option<String>,
    provider: PluginProvider,
}

impl fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContext")
            .field("plugin_name", &self.plugin_name)
            .field("config", &self.config)
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl PluginContext {
    pub(crate) fn new(
        plugin_name: &str,
        config: HashMap<String, String>,
        token: Option<String>,
        provider: PluginProvider,
    ) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            config,
            token,
            provider,
        }
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Config as of when this context was created
    pub fn config(&self) -> &HashMap<String, String> {
        &self.config
    }

    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Merge `partial` into this plugin's persisted config.
    pub async fn update_config(&self, partial: HashMap<String, String>) -> Result<HashMap<String, String>, ProviderError> {
        self.provider.update_plugin_config(&self.plugin_name, partial).await
    }

    /// Resolve an endpoint. Absolute `http(s)://` URLs pass through; anything
    /// else lands under `{api_base}/{namespace}/{plugin_name}/`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        let config = self.provider.config();
        config.api_url(&format!(
            "{}/{}/{}",
            config.plugin_api_namespace.trim_matches('/'),
            self.plugin_name,
            endpoint.trim_start_matches('/')
        ))
    }

    /// Call the backend on behalf of this plugin.
    ///
    /// Always sends the bearer token and a JSON content type. A non-2xx
    /// response fails with its body text. An empty success body yields
    /// `Value::Null`; a non-JSON one is returned as `Value::String`.
    pub async fn call_api(&self, endpoint: &str, request: ApiRequest) -> Result<Value, ProviderError> {
        let token = self.token.as_deref().ok_or(ProviderError::NotAuthenticated)?;
        let url = self.endpoint_url(endpoint);

        let mut builder = self.provider.http_client().request(request.method.clone(), &url);
        for (name, value) in &request.headers {
            if name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) || name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = builder
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            let encoded = serde_json::to_string(body).map_err(|source| ProviderError::Serialization {
                endpoint: url.clone(),
                source,
            })?;
            builder = builder.body(encoded);
        }

        let response = builder.send().await.map_err(|source| ProviderError::Transport {
            endpoint: url.clone(),
            source,
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|source| ProviderError::Transport {
            endpoint: url.clone(),
            source,
        })?;

        if !status.is_success() {
            log::warn!("Plugin '{}' API call to {} returned {}", self.plugin_name, url, status);
            return Err(ProviderError::ApiCall {
                endpoint: url,
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::error::EventSystemError;
use crate::kernel::constants::{
    EVENT_PLUGIN_CONFIG_UPDATED, EVENT_PLUGIN_DISABLED, EVENT_PLUGIN_ENABLED, EVENT_PLUGIN_ERROR,
};

/// Kinds of notifications published on the plugin event bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginEventType {
    #[serde(rename = "plugin:enabled")]
    Enabled,
    #[serde(rename = "plugin:disabled")]
    Disabled,
    #[serde(rename = "plugin:config-updated")]
    ConfigUpdated,
    #[serde(rename = "plugin:error")]
    Error,
}

impl PluginEventType {
    pub const ALL: [PluginEventType; 4] = [
        PluginEventType::Enabled,
        PluginEventType::Disabled,
        PluginEventType::ConfigUpdated,
        PluginEventType::Error,
    ];

    /// Wire name, e.g. `plugin:config-updated`
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginEventType::Enabled => EVENT_PLUGIN_ENABLED,
            PluginEventType::Disabled => EVENT_PLUGIN_DISABLED,
            PluginEventType::ConfigUpdated => EVENT_PLUGIN_CONFIG_UPDATED,
            PluginEventType::Error => EVENT_PLUGIN_ERROR,
        }
    }
}

impl fmt::Display for PluginEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginEventType {
    type Err = EventSystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PluginEventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| EventSystemError::UnknownEventType(s.to_string()))
    }
}

/// Fire-and-forget notification about a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEvent {
    #[serde(rename = "type")]
    pub event_type: PluginEventType,
    #[serde(rename = "pluginName")]
    pub plugin_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl PluginEvent {
    pub fn new(event_type: PluginEventType, plugin_name: &str, payload: Option<Value>) -> Self {
        Self {
            event_type,
            plugin_name: plugin_name.to_string(),
            payload,
        }
    }

    pub fn enabled(plugin_name: &str) -> Self {
        Self::new(PluginEventType::Enabled, plugin_name, None)
    }

    pub fn disabled(plugin_name: &str) -> Self {
        Self::new(PluginEventType::Disabled, plugin_name, None)
    }

    /// `payload` carries the merged config after the update
    pub fn config_updated(plugin_name: &str, config: &HashMap<String, String>) -> Self {
        let payload = config
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<serde_json::Map<_, _>>();
        Self::new(PluginEventType::ConfigUpdated, plugin_name, Some(Value::Object(payload)))
    }

    pub fn error(plugin_name: &str, payload: Value) -> Self {
        Self::new(PluginEventType::Error, plugin_name, Some(payload))
    }

    /// The `error` string of a `plugin:error` payload, if present
    pub fn error_message(&self) -> Option<&str> {
        self.payload.as_ref()?.get("error")?.as_str()
    }
}

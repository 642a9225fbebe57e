//! # Panelhost Plugin System Errors
//!
//! Defines error types specific to the plugin registry.
//!
//! [`PluginSystemError`] covers identity failures raised synchronously by
//! [`PluginRegistry::register`](crate::plugin_system::PluginRegistry::register)
//! (malformed name, missing display name, missing component loader) and
//! lookups that require a registered definition. Duplicate registration is
//! deliberately *not* an error; see [`RegisterOutcome`](crate::plugin_system::RegisterOutcome).

/// Plugin author facing error type for components and lifecycle hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Invalid plugin definition for '{plugin_id}': {reason}")]
    InvalidDefinition {
        plugin_id: String,
        reason: InvalidDefinitionReason,
    },

    #[error("Plugin '{plugin_id}' is not registered")]
    NotRegistered {
        plugin_id: String,
    },

    #[error("Invalid plugin category '{0}'")]
    UnknownCategory(String),
}

/// What exactly is wrong with a rejected definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDefinitionReason {
    #[error("name is required")]
    MissingName,
    #[error("name must match ^[a-z][a-z0-9-]*$")]
    MalformedName,
    #[error("displayName is required")]
    MissingDisplayName,
    #[error("loadComponent is required")]
    MissingComponentLoader,
}

impl PluginSystemError {
    pub(crate) fn invalid(plugin_id: &str, reason: InvalidDefinitionReason) -> Self {
        PluginSystemError::InvalidDefinition {
            plugin_id: plugin_id.to_string(),
            reason,
        }
    }
}

//! # Panelhost Core
//!
//! Runtime for first-party dashboard plugins: a process-wide registry of
//! plugin definitions, a per-session provider merging those definitions with
//! each user's server-held enablement and config, an event bus for lifecycle
//! notifications, and renderers that mount each plugin inside its own
//! failure boundary.
pub mod event;
pub mod kernel;
pub mod plugin_system;
pub mod provider;
pub mod renderer;
pub mod storage;
pub mod utils;

// Re-export key public types for the binary and plugin crates
pub use event::{EventBus, PluginEvent, PluginEventType, Subscription};
pub use kernel::error::Error as KernelError;
pub use kernel::{Dashboard, DashboardHost};
pub use plugin_system::{
    BoxError, ConfigField, ConfigFieldType, ConfigSchema, PluginCategory, PluginComponent, PluginDefinition,
    PluginRegistry, RegisterOutcome,
};
pub use provider::{ApiRequest, PluginContext, PluginProvider, ProviderError};
pub use renderer::{PluginRenderer, PluginView, RenderState, RenderSurface};
pub use storage::{HostConfig, HttpPluginStore, InMemoryPluginStore, UserPluginState, UserPluginStore};

#[cfg(test)]
mod tests;

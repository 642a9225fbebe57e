//! # Panelhost Plugin System
//!
//! Static side of the plugin runtime: what a plugin *is* and where it is
//! registered.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`definition`]**: The [`PluginDefinition`] model (identity, lazy
//!   component loader, sidebar placement, lifecycle hooks) and its builder.
//! - **[`schema`]**: [`ConfigSchema`], the optional description of a plugin's
//!   config keys, validated at the UI edge.
//! - **[`registry`]**: [`PluginRegistry`], the single source of truth mapping
//!   plugin name to definition, which also carries the plugin event bus.
//! - **[`error`]**: [`PluginSystemError`] for identity failures.
//!
//! Plugin crates call [`PluginRegistry::register`] exactly once at process
//! start. A malformed identity fails loudly; registering the same name twice
//! is tolerated so double registration during development does not crash the
//! host.
pub mod definition;
pub mod error;
pub mod registry;
pub mod schema;

pub use definition::{
    ComponentLoader, DestroyHook, InitHook, LoadedComponent, PluginCategory, PluginComponent, PluginDefinition,
    PluginDefinitionBuilder, PluginRoute, SidebarPlacement,
};
pub use error::{BoxError, InvalidDefinitionReason, PluginSystemError};
pub use registry::{validate_plugin_name, DuplicatePolicy, PluginRegistry, RegisterOutcome};
pub use schema::{ConfigField, ConfigFieldType, ConfigSchema, ConfigViolation, ViolationKind};

// Test module declaration
#[cfg(test)]
mod tests;

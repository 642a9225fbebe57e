//! # Panelhost Plugin Provider
//!
//! Request-scoped aggregation layer for one authenticated session.
//!
//! [`PluginProvider`] merges registry definitions with the user's enablement
//! state fetched from a [`UserPluginStore`](crate::storage::UserPluginStore),
//! exposes enable/disable/configure operations, and builds the
//! [`PluginContext`] capability object each mounted plugin receives.
//!
//! Mutators always emit their event on the registry bus *before* refreshing,
//! so subscribers observe the cause before any state derived from the
//! refreshed list.
pub mod context;
pub mod error;
pub mod manager;

pub use context::{ApiRequest, PluginContext};
pub use error::ProviderError;
pub use manager::PluginProvider;

//! # Panelhost Storage
//!
//! The per-user enablement store is external: the runtime consumes it through
//! the [`UserPluginStore`] contract but does not own it. This module holds that
//! contract, its HTTP implementation against the dashboard backend, an
//! in-memory implementation for development and tests, and the host
//! configuration used to reach the backend.
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod provider;

/// Re-export key types
pub use config::{ConfigFormat, HostConfig};
pub use error::StorageSystemError;
pub use http::HttpPluginStore;
pub use memory::InMemoryPluginStore;
pub use provider::{UserPluginState, UserPluginStore};

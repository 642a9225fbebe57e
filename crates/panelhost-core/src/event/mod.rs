//! # Panelhost Event System
//!
//! Typed, synchronous pub/sub for plugin lifecycle notifications
//! (`plugin:enabled`, `plugin:disabled`, `plugin:config-updated`,
//! `plugin:error`). Events are notifications, not a durable log.
pub mod bus;
pub mod error;
pub mod types;

use std::sync::Arc;

/// Type for handler identifiers
pub type HandlerId = u64;

/// Subscriber callback
pub type EventHandler = Arc<dyn Fn(&types::PluginEvent) + Send + Sync>;

pub use bus::{EventBus, Subscription};
pub use error::EventSystemError;
pub use types::{PluginEvent, PluginEventType};

// Test module declaration
#[cfg(test)]
mod tests;

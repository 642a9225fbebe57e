//! # Panelhost Kernel Errors
//!
//! [`Error`] aggregates the typed errors of every subsystem so the host and
//! the CLI can propagate any of them with `?`.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::event::error::EventSystemError;
use crate::plugin_system::error::PluginSystemError;
use crate::provider::error::ProviderError;
use crate::renderer::RenderFailure;
use crate::storage::error::StorageSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Render error: {0}")]
    Render(#[from] RenderFailure),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

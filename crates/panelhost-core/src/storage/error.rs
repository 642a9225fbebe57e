//! # Panelhost Storage System Errors
//!
//! Defines error types for the per-user enablement store and host
//! configuration loading.
//!
//! [`StorageSystemError`] covers transport failures talking to the backend,
//! non-2xx responses (with the server's message preserved for display),
//! undecodable payloads, and configuration file problems. None of these are
//! retried anywhere in the runtime.
use std::path::PathBuf;
use thiserror::Error;

use crate::plugin_system::PluginSystemError;

#[derive(Debug, Error)]
pub enum StorageSystemError {
    #[error("Request '{operation}' could not reach the backend: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request '{operation}' failed with status {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Refusing to address plugin '{plugin}': {source}")]
    InvalidPluginName {
        plugin: String,
        #[source]
        source: PluginSystemError,
    },

    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Deserialization from '{format}' failed: {source}")]
    DeserializationError {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedConfigFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage operation '{operation}' failed: {message}")]
    OperationFailed {
        operation: String,
        message: String,
    },
}

impl StorageSystemError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        StorageSystemError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }

    pub(crate) fn transport(operation: impl Into<String>, source: reqwest::Error) -> Self {
        StorageSystemError::Transport {
            operation: operation.into(),
            source,
        }
    }

    pub(crate) fn decode(format: &str, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        StorageSystemError::DeserializationError {
            format: format.to_string(),
            source: Box::new(source),
        }
    }
}

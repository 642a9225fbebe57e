//! # Panelhost Provider Errors
//!
//! Errors surfaced to callers of the provider mutators and of the plugin
//! capability object. Refresh failures are *not* represented here: they are
//! recorded on the provider's `error` state instead of being returned.
use thiserror::Error;

use crate::storage::error::StorageSystemError;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Failed to persist plugin state: {0}")]
    Storage(#[from] StorageSystemError),

    #[error("API call to '{endpoint}' failed with status {status}: {body}")]
    ApiCall {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("API call to '{endpoint}' could not be sent: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API call to '{endpoint}' has an unencodable body: {source}")]
    Serialization {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

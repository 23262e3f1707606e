//! services/client/src/error.rs
//!
//! Defines the primary error type for the client service.

use crate::config::ConfigError;
use trek_sync_core::onboarding::UnknownInterest;
use trek_sync_core::SyncError;

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error surfaced by a store action.
    #[error("{0}")]
    Sync(#[from] SyncError),

    /// Represents a failure to build the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A survey answer that is not one of the offered options.
    #[error("{0}")]
    Interest(#[from] UnknownInterest),

    /// A fetch failed and its store recorded this message.
    #[error("{0}")]
    Fetch(String),
}

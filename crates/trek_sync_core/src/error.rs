//! crates/trek_sync_core/src/error.rs
//!
//! Defines the error type surfaced by store actions.

use crate::domain::TrekId;
use crate::ports::PortError;

/// Errors produced by store actions.
///
/// The `Display` text is what gets recorded into a store's `error` field, so it
/// is written to be shown to a user as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    /// Transport failure before any response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response, carrying the server's message.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Login or registration was rejected.
    #[error("{0}")]
    Auth(String),

    /// The action needs a signed-in user and there is none.
    #[error("You need to be logged in to do that")]
    NotAuthenticated,

    /// Removing a favorite the server has no record of.
    #[error("No favorite record found for trek {0}")]
    FavoriteNotFound(TrekId),

    /// The persisted session could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The server answered with a body of the wrong shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<PortError> for SyncError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Network(msg) => SyncError::Network(msg),
            PortError::Http { status, message } => SyncError::Http { status, message },
            PortError::Decode(msg) => SyncError::Decode(msg),
            PortError::Storage(msg) => SyncError::Storage(msg),
        }
    }
}

impl SyncError {
    /// Reclassifies a login/signup failure as an auth rejection, keeping its message.
    pub(crate) fn into_auth(self) -> Self {
        match self {
            SyncError::Http { message, .. } => SyncError::Auth(message),
            SyncError::Network(msg) => SyncError::Auth(format!("Network error: {msg}")),
            SyncError::Decode(msg) => SyncError::Auth(format!("Unexpected response: {msg}")),
            other => other,
        }
    }
}

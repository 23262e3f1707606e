//! crates/trek_sync_core/src/ports.rs
//!
//! Defines the service contracts (traits) the stores depend on.
//! These traits form the boundary of the hexagonal architecture, so the stores
//! can run against the real REST backend or an in-memory double.

use async_trait::async_trait;

use crate::domain::{
    Credentials, FavoriteId, PersistedSession, Registration, Trek, TrekId, UserId,
};
use crate::payload::{AuthPayload, FavoriteEntry, ProfilePayload};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },
    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
    /// Durable storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    /// POST /login/
    async fn login(&self, credentials: &Credentials) -> PortResult<AuthPayload>;

    /// POST /signup/
    async fn signup(&self, registration: &Registration) -> PortResult<AuthPayload>;

    /// GET /verify-token. Any error means the token must not be trusted.
    async fn verify_token(&self, token: &str) -> PortResult<()>;

    /// PATCH /users/{id}/ with `{"profile": {"interests": [...]}}`.
    async fn update_interests(
        &self,
        token: &str,
        user_id: UserId,
        interests: &[String],
    ) -> PortResult<ProfilePayload>;
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// GET /treks/ in server order.
    async fn list_treks(&self) -> PortResult<Vec<Trek>>;

    /// GET /treks/{id}/
    async fn get_trek(&self, id: TrekId) -> PortResult<Trek>;

    /// GET /recommendations/, authenticated when a token is available.
    async fn list_recommendations(&self, token: Option<&str>) -> PortResult<Vec<Trek>>;
}

#[async_trait]
pub trait FavoritesService: Send + Sync {
    /// GET /favorites/
    async fn list_favorites(&self, token: Option<&str>) -> PortResult<Vec<FavoriteEntry>>;

    /// POST /favorites/ with `{user, trek}`.
    async fn create_favorite(
        &self,
        token: Option<&str>,
        user_id: UserId,
        trek_id: TrekId,
    ) -> PortResult<()>;

    /// DELETE /favorites/{id}/
    async fn delete_favorite(&self, token: Option<&str>, record_id: FavoriteId) -> PortResult<()>;
}

/// Durable storage for the persisted subset of the session.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load(&self) -> PortResult<Option<PersistedSession>>;

    async fn save(&self, session: &PersistedSession) -> PortResult<()>;

    /// Removing an absent session is not an error.
    async fn clear(&self) -> PortResult<()>;
}

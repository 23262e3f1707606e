pub mod domain;
pub mod error;
pub mod onboarding;
pub mod payload;
pub mod ports;
pub mod store;

#[cfg(test)]
mod testing;

pub use domain::{Credentials, PersistedSession, Registration, Trek, TrekId, UserId, UserProfile};
pub use error::SyncError;
pub use ports::{
    AuthService, CatalogService, FavoritesService, PortError, PortResult, SessionStorage,
};
pub use store::{CatalogStore, DetailStore, FavoritesStore, SessionStore};

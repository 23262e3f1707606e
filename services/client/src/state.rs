//! services/client/src/state.rs
//!
//! Defines the application state: every store, wired to its adapters once at
//! startup and shared by whatever drives the UI.

use std::sync::Arc;

use crate::adapters::{HttpBackend, JsonFileStorage};
use crate::config::Config;
use crate::error::ClientError;
use trek_sync_core::domain::TrekId;
use trek_sync_core::ports::{AuthService, CatalogService, FavoritesService, SessionStorage};
use trek_sync_core::store::{CatalogStore, DetailStore, FavoritesStore, SessionStore};

/// The shared application state, created once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<SessionStore>,
    pub catalog: Arc<CatalogStore>,
    pub favorites: Arc<FavoritesStore>,
    pub detail: Arc<DetailStore>,
}

impl AppState {
    /// Wires the stores to the REST backend and the session file named in `config`.
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        let backend = Arc::new(HttpBackend::from_config(&config)?);
        let storage = Arc::new(JsonFileStorage::new(config.session_path.clone()));
        Ok(Self::with_adapters(config, backend, storage))
    }

    /// Wires the stores to any backend that speaks all three service ports.
    pub fn with_adapters<B>(
        config: Config,
        backend: Arc<B>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self
    where
        B: AuthService + CatalogService + FavoritesService + 'static,
    {
        let session = Arc::new(SessionStore::new(backend.clone(), storage));
        let catalog = Arc::new(CatalogStore::new(backend.clone(), session.clone()));
        let favorites = Arc::new(FavoritesStore::new(
            backend.clone(),
            catalog.clone(),
            session.clone(),
        ));
        let detail = Arc::new(DetailStore::new(backend));

        Self {
            config: Arc::new(config),
            session,
            catalog,
            favorites,
            detail,
        }
    }

    /// Loads the catalog and the user's favorites, failing if the favorites
    /// could not be read.
    pub async fn sync_favorites(&self) -> Result<(), ClientError> {
        self.favorites.clear_error();
        self.catalog.fetch_treks().await;
        self.favorites.fetch_favorites().await;
        match self.favorites.error() {
            Some(err) => Err(ClientError::Fetch(err)),
            None => Ok(()),
        }
    }

    /// Toggles a favorite against a freshly loaded favorites list. Returns
    /// whether the trek is a favorite afterwards.
    ///
    /// Nothing is sent when the list cannot be loaded.
    pub async fn toggle_favorite(&self, trek_id: TrekId) -> Result<bool, ClientError> {
        self.sync_favorites().await?;
        Ok(self.favorites.toggle_favorite(trek_id).await?)
    }
}

//! crates/trek_sync_core/src/store/favorites.rs
//!
//! The favorites substore: which treks the user has favorited, kept both as an
//! id set for membership checks and as trek objects for display.
//!
//! A toggle resolves everything the new state needs before it sends the
//! mutating request, and touches the state only once the server has agreed.
//! A failed toggle therefore leaves the previous favorites intact.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::{FavoriteId, Trek, TrekId, UserId};
use crate::error::SyncError;
use crate::ports::FavoritesService;
use crate::store::{CatalogStore, SessionStore};

//=========================================================================================
// FavoriteSet
//=========================================================================================

/// Favorited trek ids paired with the matching trek objects.
///
/// Fields are private so the ids and the treks can only change together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoriteSet {
    ids: BTreeSet<TrekId>,
    treks: Vec<Trek>,
}

impl FavoriteSet {
    /// Builds a set from treks, keeping the first occurrence of each id.
    pub fn from_treks(treks: impl IntoIterator<Item = Trek>) -> Self {
        let mut set = Self::default();
        for trek in treks {
            set.insert(trek);
        }
        set
    }

    /// Adds a trek; returns false if it was already present.
    pub fn insert(&mut self, trek: Trek) -> bool {
        if !self.ids.insert(trek.id) {
            return false;
        }
        self.treks.push(trek);
        true
    }

    /// Removes a trek; returns false if it was not present.
    pub fn remove(&mut self, id: TrekId) -> bool {
        if !self.ids.remove(&id) {
            return false;
        }
        self.treks.retain(|t| t.id != id);
        true
    }

    pub fn contains(&self, id: TrekId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TrekId> + '_ {
        self.ids.iter().copied()
    }

    pub fn treks(&self) -> &[Trek] {
        &self.treks
    }
}

//=========================================================================================
// FavoritesStore
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesState {
    pub favorites: FavoriteSet,
    pub error: Option<String>,
}

pub struct FavoritesStore {
    api: Arc<dyn FavoritesService>,
    catalog: Arc<CatalogStore>,
    session: Arc<SessionStore>,
    state: watch::Sender<FavoritesState>,
}

impl FavoritesStore {
    pub fn new(
        api: Arc<dyn FavoritesService>,
        catalog: Arc<CatalogStore>,
        session: Arc<SessionStore>,
    ) -> Self {
        let (state, _) = watch::channel(FavoritesState::default());
        Self {
            api,
            catalog,
            session,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FavoritesState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> FavoritesState {
        self.state.borrow().clone()
    }

    pub fn favorite_treks(&self) -> Vec<Trek> {
        self.state.borrow().favorites.treks().to_vec()
    }

    pub fn is_favorite(&self, trek_id: TrekId) -> bool {
        self.state.borrow().favorites.contains(trek_id)
    }

    pub fn favorite_count(&self) -> usize {
        self.state.borrow().favorites.len()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }

    /// Rebuilds the favorites from the server.
    ///
    /// Join records are resolved into trek objects first; if any cannot be,
    /// the current favorites are kept and the error recorded.
    pub async fn fetch_favorites(&self) {
        match self.load().await {
            Ok(favorites) => {
                info!("Fetched {} favorites", favorites.len());
                self.state.send_modify(|s| s.favorites = favorites);
            }
            Err(err) => {
                warn!("Error fetching favorites: {}", err);
                self.record(&err);
            }
        }
    }

    /// Adds or removes a favorite. Returns whether the trek is now favorited.
    pub async fn toggle_favorite(&self, trek_id: TrekId) -> Result<bool, SyncError> {
        let Some(user_id) = self.session.user_id() else {
            let err = SyncError::NotAuthenticated;
            warn!("Cannot toggle favorite {}: {}", trek_id, err);
            self.record(&err);
            return Err(err);
        };
        let token = self.session.token();

        let result = if self.is_favorite(trek_id) {
            self.remove(token.as_deref(), trek_id).await.map(|()| false)
        } else {
            self.add(token.as_deref(), user_id, trek_id)
                .await
                .map(|()| true)
        };

        match &result {
            Ok(now_favorite) => info!("Trek {} favorited: {}", trek_id, now_favorite),
            Err(err) => {
                warn!("Error toggling favorite {}: {}", trek_id, err);
                self.record(err);
            }
        }
        result
    }

    async fn load(&self) -> Result<FavoriteSet, SyncError> {
        let token = self.session.token();
        let entries = self.api.list_favorites(token.as_deref()).await?;
        let treks = join_all(entries.into_iter().map(|entry| async move {
            match entry.into_trek() {
                Ok(trek) => Some(trek),
                Err(id) => match self.catalog.resolve_trek(id).await {
                    Ok(trek) => Some(trek),
                    Err(err) => {
                        warn!("Skipping favorite for unresolvable trek {}: {}", id, err);
                        None
                    }
                },
            }
        }))
        .await;
        Ok(FavoriteSet::from_treks(treks.into_iter().flatten()))
    }

    async fn add(
        &self,
        token: Option<&str>,
        user_id: UserId,
        trek_id: TrekId,
    ) -> Result<(), SyncError> {
        let trek = self.catalog.resolve_trek(trek_id).await?;
        self.api.create_favorite(token, user_id, trek_id).await?;
        self.state.send_modify(|s| {
            s.favorites.insert(trek);
        });
        Ok(())
    }

    async fn remove(&self, token: Option<&str>, trek_id: TrekId) -> Result<(), SyncError> {
        let record_id = self.resolve_record_id(token, trek_id).await?;
        self.api.delete_favorite(token, record_id).await?;
        self.state.send_modify(|s| {
            s.favorites.remove(trek_id);
        });
        Ok(())
    }

    // TODO: delete by (user, trek) directly once the backend accepts it; the
    // list-then-match lookup races with favorites changed from another device.
    async fn resolve_record_id(
        &self,
        token: Option<&str>,
        trek_id: TrekId,
    ) -> Result<FavoriteId, SyncError> {
        self.api
            .list_favorites(token)
            .await?
            .iter()
            .find(|entry| entry.trek_id() == trek_id)
            .map(|entry| entry.record_id())
            .ok_or(SyncError::FavoriteNotFound(trek_id))
    }

    fn record(&self, err: &SyncError) {
        self.state.send_modify(|s| s.error = Some(err.to_string()));
    }
}

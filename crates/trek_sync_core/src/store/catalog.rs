//! crates/trek_sync_core/src/store/catalog.rs
//!
//! The catalog store: the full trek list, its featured/popular slices and the
//! personalized recommendations.
//!
//! Concurrent fetches are not coalesced. Whichever response lands last wins.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::{Trek, TrekId};
use crate::error::SyncError;
use crate::ports::CatalogService;
use crate::store::SessionStore;

pub const FEATURED_COUNT: usize = 5;
pub const POPULAR_COUNT: usize = 5;
pub const RECOMMENDED_LIMIT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    /// Server order is preserved.
    pub treks: Vec<Trek>,
    pub featured: Vec<Trek>,
    pub popular: Vec<Trek>,
    pub recommended: Vec<Trek>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Splits a catalog into its featured and popular views.
///
/// Featured is the first five. Popular is the next five, or the same first
/// five when there are fewer than ten treks in total.
pub fn derive_views(treks: &[Trek]) -> (Vec<Trek>, Vec<Trek>) {
    let head = treks.len().min(FEATURED_COUNT);
    let featured = treks[..head].to_vec();
    let popular = if treks.len() >= FEATURED_COUNT + POPULAR_COUNT {
        treks[FEATURED_COUNT..FEATURED_COUNT + POPULAR_COUNT].to_vec()
    } else {
        featured.clone()
    };
    (featured, popular)
}

pub struct CatalogStore {
    api: Arc<dyn CatalogService>,
    session: Arc<SessionStore>,
    state: watch::Sender<CatalogState>,
}

impl CatalogStore {
    pub fn new(api: Arc<dyn CatalogService>, session: Arc<SessionStore>) -> Self {
        let (state, _) = watch::channel(CatalogState::default());
        Self {
            api,
            session,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    pub fn treks(&self) -> Vec<Trek> {
        self.state.borrow().treks.clone()
    }

    pub fn featured(&self) -> Vec<Trek> {
        self.state.borrow().featured.clone()
    }

    pub fn popular(&self) -> Vec<Trek> {
        self.state.borrow().popular.clone()
    }

    pub fn recommended(&self) -> Vec<Trek> {
        self.state.borrow().recommended.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }

    /// Looks a trek up in the cached catalog.
    pub fn find(&self, id: TrekId) -> Option<Trek> {
        self.state.borrow().treks.iter().find(|t| t.id == id).cloned()
    }

    /// Returns the cached trek, fetching it from the server if the catalog
    /// has not seen it.
    pub async fn resolve_trek(&self, id: TrekId) -> Result<Trek, SyncError> {
        if let Some(trek) = self.find(id) {
            return Ok(trek);
        }
        Ok(self.api.get_trek(id).await?)
    }

    /// Replaces the catalog with the server's list and re-derives its views.
    pub async fn fetch_treks(&self) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        match self.api.list_treks().await {
            Ok(treks) => {
                info!("Fetched {} treks", treks.len());
                let (featured, popular) = derive_views(&treks);
                self.state.send_modify(|s| {
                    s.treks = treks;
                    s.featured = featured;
                    s.popular = popular;
                    s.loading = false;
                });
            }
            Err(e) => {
                let err = SyncError::from(e);
                warn!("Error fetching treks: {}", err);
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(err.to_string());
                });
            }
        }
    }

    /// Loads recommendations for the current user.
    ///
    /// Failure empties the list and records the error instead of surfacing it.
    pub async fn fetch_recommended_treks(&self) {
        let token = self.session.token();
        match self.api.list_recommendations(token.as_deref()).await {
            Ok(mut treks) => {
                treks.truncate(RECOMMENDED_LIMIT);
                self.state.send_modify(|s| s.recommended = treks);
            }
            Err(e) => {
                let err = SyncError::from(e);
                warn!("Error fetching recommended treks: {}", err);
                self.state.send_modify(|s| {
                    s.recommended.clear();
                    s.error = Some(err.to_string());
                });
            }
        }
    }
}

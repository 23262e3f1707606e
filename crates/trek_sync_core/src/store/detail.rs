//! crates/trek_sync_core/src/store/detail.rs
//!
//! The detail store: the single trek currently on screen. Its loading and error
//! fields are independent from the catalog's.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::domain::{Trek, TrekId};
use crate::error::SyncError;
use crate::ports::CatalogService;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub current_trek: Option<Trek>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct DetailStore {
    api: Arc<dyn CatalogService>,
    state: watch::Sender<DetailState>,
}

impl DetailStore {
    pub fn new(api: Arc<dyn CatalogService>) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self { api, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn current_trek(&self) -> Option<Trek> {
        self.state.borrow().current_trek.clone()
    }

    pub async fn fetch_trek_by_id(&self, id: TrekId) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.api.get_trek(id).await;
        self.state.send_modify(|s| {
            s.loading = false;
            match result {
                Ok(trek) => s.current_trek = Some(trek),
                Err(e) => {
                    let err = SyncError::from(e);
                    warn!("Error fetching trek {}: {}", id, err);
                    s.current_trek = None;
                    s.error = Some(err.to_string());
                }
            }
        });
    }

    /// Called when the detail screen goes away, so the next one never shows a
    /// stale trek.
    pub fn clear_current_trek(&self) {
        self.state.send_modify(|s| *s = DetailState::default());
    }
}

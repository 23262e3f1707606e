//! services/client/src/adapters/storage.rs
//!
//! This module contains the durable session storage, the concrete implementation
//! of the `SessionStorage` port. The session is one pretty-printed JSON file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use trek_sync_core::domain::PersistedSession;
use trek_sync_core::ports::{PortError, PortResult, SessionStorage};

/// Stores the persisted session in a single JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(err: impl std::fmt::Display) -> PortError {
    PortError::Storage(err.to_string())
}

#[async_trait]
impl SessionStorage for JsonFileStorage {
    async fn load(&self) -> PortResult<Option<PersistedSession>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(e)),
        };
        serde_json::from_str(&raw).map(Some).map_err(storage_error)
    }

    async fn save(&self, session: &PersistedSession) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(storage_error)?;
        }
        let raw = serde_json::to_string_pretty(session).map_err(storage_error)?;

        // Readers only ever see a complete file: write beside it, then rename.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).await.map_err(storage_error)?;
        fs::rename(&tmp, &self.path).await.map_err(storage_error)?;
        debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(e)),
        }
    }
}

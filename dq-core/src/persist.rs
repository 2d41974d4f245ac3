//! Game snapshots for save/load between runs.

use crate::store::{MemoryStore, StoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Current save file version.
const SAVE_VERSION: u32 = 1;

/// A saved game: every character, move and consequence table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedGame {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the save was created (seconds since the Unix epoch).
    pub saved_at: String,

    pub store: MemoryStore,
}

impl SavedGame {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: timestamp_now(),
            store,
        }
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path).await?;
        let saved: Self = serde_json::from_str(&content)?;

        if saved.version != SAVE_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }

        Ok(saved)
    }
}

/// Load the store saved at `path`, or start empty if nothing is there yet.
pub async fn load_or_default(path: impl AsRef<Path>) -> Result<MemoryStore, StoreError> {
    let path = path.as_ref();
    if !fs::try_exists(path).await? {
        return Ok(MemoryStore::new());
    }
    Ok(SavedGame::load_json(path).await?.store)
}

fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", now.as_secs())
}

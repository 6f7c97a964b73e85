//! State store - load/save of the single orchestra document
//!
//! Whole-document semantics under one well-known key: no partial updates,
//! last write wins. The deployment is expected to run at most one
//! invocation at a time; the trait seam is where an optimistic version
//! check would slot in if that ever changes.

use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::OrchestraError;
use crate::state::OrchestraState;

/// Load/save boundary for the orchestra document
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetch the persisted document, if one exists
    async fn load(&self) -> Result<Option<OrchestraState>, OrchestraError>;

    /// Persist the full document
    async fn save(&self, state: &OrchestraState) -> Result<(), OrchestraError>;
}

/// File-backed store holding the document as one JSON file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> Result<Option<OrchestraState>, OrchestraError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let state = serde_json::from_slice(&bytes)?;
                Ok(Some(state))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(OrchestraError::Store(e.to_string())),
        }
    }

    async fn save(&self, state: &OrchestraState) -> Result<(), OrchestraError> {
        let bytes = serde_json::to_vec_pretty(state)?;

        // Write-then-rename so a crash mid-write never truncates the document.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| OrchestraError::Store(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| OrchestraError::Store(e.to_string()))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Persisted orchestra state");
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs
///
/// Stores the serialized document rather than the struct, so save/load
/// exercises the same codec path as the file store.
#[derive(Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a save has landed, for assertions on persist behavior
    pub fn has_document(&self) -> bool {
        self.document.lock().is_some()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<Option<OrchestraState>, OrchestraError> {
        let guard = self.document.lock();
        match guard.as_ref() {
            Some(doc) => Ok(Some(serde_json::from_str(doc)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &OrchestraState) -> Result<(), OrchestraError> {
        let doc = serde_json::to_string(state)?;
        *self.document.lock() = Some(doc);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_file_store_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        let state = OrchestraState::bootstrap("orc-file", Utc::now());
        store.save(&state).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.orchestra_id, "orc-file");
        assert_eq!(loaded.agents.len(), state.agents.len());
    }

    #[tokio::test]
    async fn test_file_store_overwrites_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        let mut state = OrchestraState::bootstrap("orc-file", Utc::now());
        store.save(&state).await.unwrap();

        state.total_actions = 7;
        store.save(&state).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.total_actions, 7);
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());
        assert!(!store.has_document());

        let state = OrchestraState::bootstrap("orc-mem", Utc::now());
        store.save(&state).await.unwrap();

        assert!(store.has_document());
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.orchestra_id, "orc-mem");
    }
}

//! Persistence bridge for the panel snapshot.
//!
//! Only the roster, project state and message log survive a restart. The
//! snapshot is opaque to the store: one JSON document under one key.

use crate::config::is_valid_key;
use crate::reconcile::MessageBuckets;
use conclave_core::{Agent, ProjectState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    #[serde(default)]
    pub project_state: ProjectState,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub messages: MessageBuckets,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),
}

/// Host-provided key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        if !is_valid_key(key) {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, value)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Saves the snapshot under one key, skipping writes that would not change it.
pub struct PersistenceBridge<S: KeyValueStore> {
    store: S,
    key: String,
    last_saved: Option<PersistedSnapshot>,
}

impl<S: KeyValueStore> PersistenceBridge<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            last_saved: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the stored snapshot. Missing or unreadable snapshots yield `None`.
    pub fn restore(&mut self) -> Option<PersistedSnapshot> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read snapshot");
                return None;
            }
        };
        match serde_json::from_str::<PersistedSnapshot>(&raw) {
            Ok(snapshot) => {
                self.last_saved = Some(snapshot.clone());
                Some(snapshot)
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Discarding corrupt snapshot");
                None
            }
        }
    }

    /// Write `snapshot` unless it equals the last one written or restored.
    ///
    /// Returns whether a write happened.
    pub fn save_if_changed(&mut self, snapshot: &PersistedSnapshot) -> Result<bool, PersistenceError> {
        if self.last_saved.as_ref() == Some(snapshot) {
            return Ok(false);
        }
        let contents = serde_json::to_string_pretty(snapshot)?;
        self.store.set(&self.key, &contents)?;
        self.last_saved = Some(snapshot.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_core::{AgentRecord, MessagePatch, Normalizer};
    use crate::config::ReconcileSettings;

    fn snapshot() -> PersistedSnapshot {
        let mut messages = MessageBuckets::new();
        messages.upsert(MessagePatch::with_id("m1"), &ReconcileSettings::default());
        PersistedSnapshot {
            project_state: ProjectState {
                initialized: true,
                name: Some("demo".into()),
                ..ProjectState::default()
            },
            agents: vec![Normalizer::default()
                .agent(AgentRecord::with_id("a1").role("Engineer"))
                .unwrap()],
            messages,
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut bridge = PersistenceBridge::new(FileStore::new(dir.path()), "panel");
        assert!(bridge.restore().is_none());
        assert!(bridge.save_if_changed(&snapshot()).unwrap());
        assert!(dir.path().join("panel.json").exists());

        let mut reopened = PersistenceBridge::new(FileStore::new(dir.path()), "panel");
        assert_eq!(reopened.restore(), Some(snapshot()));
    }

    #[test]
    fn test_unchanged_snapshot_is_not_rewritten() {
        let mut bridge = PersistenceBridge::new(MemoryStore::new(), "panel");
        let snap = snapshot();
        assert!(bridge.save_if_changed(&snap).unwrap());
        assert!(!bridge.save_if_changed(&snap).unwrap());
    }

    #[test]
    fn test_corrupt_snapshot_restores_nothing() {
        let mut store = MemoryStore::new();
        store.set("panel", "{not json").unwrap();
        let mut bridge = PersistenceBridge::new(store, "panel");
        assert!(bridge.restore().is_none());
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        assert!(matches!(
            store.set("../escape", "{}"),
            Err(PersistenceError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_partial_snapshot_fills_defaults() {
        let snapshot: PersistedSnapshot = serde_json::from_str(r#"{"agents": []}"#).unwrap();
        assert_eq!(snapshot, PersistedSnapshot::default());
    }
}

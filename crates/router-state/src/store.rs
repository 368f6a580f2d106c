//! The state store capability and its JSON-file implementation.

use async_trait::async_trait;
use router_core::{RouterError, RouterResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Capability for persisting named JSON-shaped records.
///
/// Each `save` replaces the whole record atomically: concurrent readers see
/// either the previous or the new value, never a partial write.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load a record, or `None` when it has never been saved.
    ///
    /// # Errors
    /// `Persistence` when the record cannot be read, `MalformedState` when
    /// it exists but does not parse as JSON.
    async fn load(&self, record: &str) -> RouterResult<Option<Value>>;

    /// Atomically replace a record.
    ///
    /// # Errors
    /// `Persistence` when the record cannot be written.
    async fn save(&self, record: &str, value: &Value) -> RouterResult<()>;
}

/// Load a typed record, falling back to its default value.
///
/// A missing record yields the default. A malformed record also yields the
/// default, reported at warning level: a corrupt file must not take the
/// process down. I/O failures still propagate, so an operation never runs
/// on state it merely failed to read.
///
/// # Errors
/// Returns `Persistence` errors from the underlying store.
pub async fn load_or_default<T>(store: &dyn StateStore, record: &str) -> RouterResult<T>
where
    T: DeserializeOwned + Default,
{
    match store.load(record).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(parsed) => Ok(parsed),
            Err(err) => {
                warn!(record = record, error = %err, "persisted record is malformed, resetting to default");
                Ok(T::default())
            }
        },
        Ok(None) => Ok(T::default()),
        Err(RouterError::MalformedState { record, message }) => {
            warn!(record = %record, error = %message, "persisted record is malformed, resetting to default");
            Ok(T::default())
        }
        Err(err) => Err(err),
    }
}

/// Serialize and save a typed record.
///
/// # Errors
/// Returns `Serialization` or `Persistence` errors.
pub async fn save_record<T>(store: &dyn StateStore, record: &str, value: &T) -> RouterResult<()>
where
    T: Serialize,
{
    let value = serde_json::to_value(value)?;
    store.save(record, &value).await
}

/// File-backed state store keeping one pretty-printed JSON file per record.
///
/// Writes go to a sibling temp file followed by a rename, so a record on
/// disk is always a complete document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`. The directory is created on first
    /// save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the record files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, record: &str) -> PathBuf {
        self.dir.join(format!("{record}.json"))
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self, record: &str) -> RouterResult<Option<Value>> {
        let path = self.record_path(record);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(record = record, path = %path.display(), "record not present");
                return Ok(None);
            }
            Err(err) => return Err(RouterError::persistence(record, err)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(err) => Err(RouterError::MalformedState {
                record: record.to_string(),
                message: err.to_string(),
            }),
        }
    }

    async fn save(&self, record: &str, value: &Value) -> RouterResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| RouterError::persistence(record, err))?;

        let bytes = serde_json::to_vec_pretty(value)?;
        let path = self.record_path(record);
        let tmp = self.dir.join(format!("{record}.json.tmp"));

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|err| RouterError::persistence(record, err))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|err| RouterError::persistence(record, err))?;

        debug!(record = record, path = %path.display(), bytes = bytes.len(), "record saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{PersistedRouterState, ROUTER_STATE_RECORD};
    use router_core::ModelId;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_missing_record_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path());
        assert!(store.load("stats").await.expect("load").is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path());

        let value = json!({"gemini-1.5-flash": [{"latency_ms": 120.0}]});
        store.save("stats", &value).await.expect("save");

        let loaded = store.load("stats").await.expect("load").expect("present");
        assert_eq!(loaded, value);
    }

    #[tokio::test]
    async fn test_save_replaces_whole_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path());

        store.save("stats", &json!({"a": 1})).await.expect("save");
        store.save("stats", &json!({"b": 2})).await.expect("save");

        let loaded = store.load("stats").await.expect("load").expect("present");
        assert_eq!(loaded, json!({"b": 2}));
    }

    #[tokio::test]
    async fn test_malformed_record_resets_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("router_state.json"), b"{not json").expect("write");

        let store = JsonFileStore::new(dir.path());
        let state: PersistedRouterState = load_or_default(&store, ROUTER_STATE_RECORD)
            .await
            .expect("load");
        assert_eq!(state, PersistedRouterState::default());
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path());

        let state = PersistedRouterState {
            locked_model: Some(ModelId::from("gemini-1.5-pro")),
        };
        save_record(&store, ROUTER_STATE_RECORD, &state)
            .await
            .expect("save");

        let back: PersistedRouterState = load_or_default(&store, ROUTER_STATE_RECORD)
            .await
            .expect("load");
        assert_eq!(back, state);
    }
}

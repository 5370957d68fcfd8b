//! Persisted pilot selection.
//!
//! The selected pilot is shared by every operation in the process and survives
//! restarts. It lives in a small JSON key-value file so other tools using the
//! same file keep their own keys.

use alloy_primitives::Address;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Key under which the selection is stored.
pub const STORAGE_KEY: &str = "supercluster.selectedPilot";

#[derive(Error, Debug)]
pub enum PilotStoreError {
    #[error("Failed to access pilot store {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode pilot store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Parse a persisted selection. Only `0x`-prefixed 20 byte addresses are accepted.
pub fn parse_selection(value: &str) -> Option<Address> {
    if !value.starts_with("0x") {
        return None;
    }
    value.parse().ok()
}

/// Process-wide pilot selection backed by a file.
#[derive(Debug)]
pub struct PilotStore {
    path: PathBuf,
    default: Address,
    current: watch::Sender<Address>,
}

impl PilotStore {
    /// Open the store, falling back to `default` when nothing valid is persisted.
    pub async fn open(path: impl Into<PathBuf>, default: Address) -> Result<Self, PilotStoreError> {
        let path = path.into();
        let initial = read_selection(&path).await?.unwrap_or(default);
        debug!(path = %path.display(), pilot = %initial, "Pilot store opened");

        Ok(Self {
            path,
            default,
            current: watch::Sender::new(initial),
        })
    }

    /// The selected pilot. Never empty.
    pub fn current(&self) -> Address {
        *self.current.borrow()
    }

    pub const fn default_pilot(&self) -> Address {
        self.default
    }

    /// Persist a new selection and notify subscribers.
    pub async fn select(&self, pilot: Address) -> Result<(), PilotStoreError> {
        let mut entries = read_entries(&self.path).await?.unwrap_or_default();
        entries.insert(STORAGE_KEY.to_string(), Value::String(pilot.to_string()));
        write_entries(&self.path, &entries).await?;

        info!(pilot = %pilot, "Pilot selected");
        self.publish(pilot);
        Ok(())
    }

    /// Re-read the persisted selection, e.g. after another process changed it.
    ///
    /// Returns true when the selection changed.
    pub async fn reload(&self) -> Result<bool, PilotStoreError> {
        let pilot = read_selection(&self.path).await?.unwrap_or(self.default);
        Ok(self.publish(pilot))
    }

    /// Selection as currently persisted. Falls back to the last known value
    /// when the store cannot be read.
    pub async fn latest(&self) -> Address {
        if let Err(e) = self.reload().await {
            warn!(path = %self.path.display(), error = %e, "Pilot store reload failed, using last selection");
        }
        self.current()
    }

    /// Receiver notified on every change of selection.
    pub fn subscribe(&self) -> watch::Receiver<Address> {
        self.current.subscribe()
    }

    fn publish(&self, pilot: Address) -> bool {
        self.current.send_if_modified(|current| {
            if *current == pilot {
                return false;
            }
            *current = pilot;
            true
        })
    }
}

async fn read_entries(path: &Path) -> Result<Option<Map<String, Value>>, PilotStoreError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PilotStoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match serde_json::from_str::<Map<String, Value>>(&contents) {
        Ok(entries) => Ok(Some(entries)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Pilot store is not a JSON object, ignoring");
            Ok(None)
        }
    }
}

async fn read_selection(path: &Path) -> Result<Option<Address>, PilotStoreError> {
    let Some(entries) = read_entries(path).await? else {
        return Ok(None);
    };

    match entries.get(STORAGE_KEY) {
        None => Ok(None),
        Some(Value::String(raw)) => {
            let parsed = parse_selection(raw);
            if parsed.is_none() {
                warn!(value = %raw, "Persisted pilot is not an address, using default");
            }
            Ok(parsed)
        }
        Some(other) => {
            warn!(value = %other, "Persisted pilot is not a string, using default");
            Ok(None)
        }
    }
}

async fn write_entries(path: &Path, entries: &Map<String, Value>) -> Result<(), PilotStoreError> {
    let io_err = |source: std::io::Error| PilotStoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let contents = serde_json::to_string_pretty(entries)?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DEFAULT: Address = Address::repeat_byte(0xaa);
    const OTHER: Address = Address::repeat_byte(0xbb);

    #[test]
    fn test_parse_selection() {
        assert_eq!(
            parse_selection("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"),
            Some(OTHER)
        );
        assert_eq!(parse_selection("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"), None);
        assert_eq!(parse_selection("not-an-address"), None);
        assert_eq!(parse_selection("0x1234"), None);
        assert_eq!(parse_selection(""), None);
    }

    #[tokio::test]
    async fn test_missing_file_uses_default() {
        let dir = tempdir().unwrap();
        let store = PilotStore::open(dir.path().join("store.json"), DEFAULT)
            .await
            .unwrap();
        assert_eq!(store.current(), DEFAULT);
    }

    #[tokio::test]
    async fn test_malformed_value_uses_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"supercluster.selectedPilot":"not-an-address"}"#).unwrap();

        let store = PilotStore::open(&path, DEFAULT).await.unwrap();
        assert_eq!(store.current(), DEFAULT);
    }

    #[tokio::test]
    async fn test_corrupt_file_uses_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let store = PilotStore::open(&path, DEFAULT).await.unwrap();
        assert_eq!(store.current(), DEFAULT);
    }

    #[tokio::test]
    async fn test_select_persists_and_notifies() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let store = PilotStore::open(&path, DEFAULT).await.unwrap();
        let mut rx = store.subscribe();

        store.select(OTHER).await.unwrap();
        assert_eq!(store.current(), OTHER);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), OTHER);

        let reopened = PilotStore::open(&path, DEFAULT).await.unwrap();
        assert_eq!(reopened.current(), OTHER);
    }

    #[tokio::test]
    async fn test_select_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = PilotStore::open(&path, DEFAULT).await.unwrap();
        store.select(OTHER).await.unwrap();

        let raw: Map<String, Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(
            parse_selection(raw[STORAGE_KEY].as_str().unwrap()),
            Some(OTHER)
        );
    }

    #[tokio::test]
    async fn test_reload_picks_up_external_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = PilotStore::open(&path, DEFAULT).await.unwrap();
        let mut rx = store.subscribe();

        // unchanged file, no notification
        assert!(!store.reload().await.unwrap());
        assert!(!rx.has_changed().unwrap());

        std::fs::write(
            &path,
            r#"{"supercluster.selectedPilot":"0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"}"#,
        )
        .unwrap();
        assert!(store.reload().await.unwrap());
        assert_eq!(*rx.borrow_and_update(), OTHER);

        std::fs::remove_file(&path).unwrap();
        assert!(store.reload().await.unwrap());
        assert_eq!(store.current(), DEFAULT);
    }

    #[tokio::test]
    async fn test_latest_follows_other_writers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = PilotStore::open(&path, DEFAULT).await.unwrap();

        let other_process = PilotStore::open(&path, DEFAULT).await.unwrap();
        other_process.select(OTHER).await.unwrap();
        assert_eq!(store.current(), DEFAULT);
        assert_eq!(store.latest().await, OTHER);

        // unreadable store keeps the last good selection
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert_eq!(store.latest().await, OTHER);
    }
}

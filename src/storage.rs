//! Key–value preference storage plus a change watcher.
//!
//! Preferences live in a flat TOML table (`storage.toml` in the data dir).
//! Other processes may edit the file; [`StorageWatcher`] polls it and reports
//! per-key changes so the UI can react the same way it does to its own clicks.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Key the selected language is stored under
pub const LANGUAGE_KEY: &str = "language";

/// Value returned when no language has been stored yet
pub const DEFAULT_LANGUAGE: &str = "en";

pub type Snapshot = BTreeMap<String, String>;

/// File-backed key–value store
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored pair
    ///
    /// A missing file is an empty store. A file that fails to parse is logged
    /// and also treated as empty.
    pub fn snapshot(&self) -> Snapshot {
        self.parse_snapshot(fs::read_to_string(&self.path))
    }

    /// [`snapshot`](Self::snapshot) without blocking the runtime
    pub async fn load_snapshot(&self) -> Snapshot {
        self.parse_snapshot(tokio::fs::read_to_string(&self.path).await)
    }

    fn parse_snapshot(&self, read: std::io::Result<String>) -> Snapshot {
        let contents = match read {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Snapshot::new(),
            Err(e) => {
                tracing::warn!("Failed to read preferences {:?}: {}", self.path, e);
                return Snapshot::new();
            }
        };

        match toml::from_str(&contents) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("Ignoring unreadable preferences {:?}: {}", self.path, e);
                Snapshot::new()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.snapshot().remove(key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.snapshot();
        map.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create preference dir: {:?}", parent))?;
        }

        let contents = toml::to_string_pretty(&map).context("Failed to serialize preferences")?;
        fs::write(&self.path, contents)
            .context(format!("Failed to write preferences: {:?}", self.path))?;
        tracing::debug!("Stored preference {} = {}", key, value);
        Ok(())
    }

    /// Stored language, or `en` if none
    pub fn language(&self) -> String {
        self.get(LANGUAGE_KEY)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    pub fn set_language(&self, code: &str) -> Result<()> {
        self.set(LANGUAGE_KEY, code)
    }
}

/// A key whose value changed since the last poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// `None` when the key was removed
    pub new_value: Option<String>,
}

/// Keys that differ between two snapshots
pub fn diff_snapshots(old: &Snapshot, new: &Snapshot) -> Vec<StorageEvent> {
    let mut events = Vec::new();

    for (key, value) in new {
        if old.get(key) != Some(value) {
            events.push(StorageEvent {
                key: key.clone(),
                new_value: Some(value.clone()),
            });
        }
    }
    for key in old.keys() {
        if !new.contains_key(key) {
            events.push(StorageEvent {
                key: key.clone(),
                new_value: None,
            });
        }
    }

    events
}

/// Polls a [`PreferenceStore`] and emits [`StorageEvent`]s
pub struct StorageWatcher {
    task: JoinHandle<()>,
}

impl StorageWatcher {
    pub fn spawn(
        store: PreferenceStore,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<StorageEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let mut last = store.load_snapshot().await;
            let mut interval = tokio::time::interval(poll_interval);
            interval.tick().await;

            loop {
                interval.tick().await;
                let current = store.load_snapshot().await;
                for event in diff_snapshots(&last, &current) {
                    tracing::debug!("Preference changed externally: {:?}", event);
                    if tx.send(event).is_err() {
                        return;
                    }
                }
                last = current;
            }
        });

        (Self { task }, rx)
    }
}

impl Drop for StorageWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// wordfilter-core/src/store/file.rs
//! JSON-file `RuleStore` shared between processes.
//!
//! The file holds a single JSON object of records. Reads take a shared lock.
//! Every write is a read-modify-write done while holding an exclusive lock on
//! a sidecar `<file>.lock`, and the new contents go through a temporary file
//! that is renamed into place.
//! Writes made by this process are broadcast immediately; writes made by any
//! other process are picked up by `poll_external_change`, which
//! `spawn_store_watcher` runs on an interval.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::{RuleStore, StorageChange, CHANGE_CHANNEL_CAPACITY};
use crate::errors::WordFilterError;

const STORE_FILE_TMP_SUFFIX: &str = ".tmp";
const STORE_FILE_LOCK_SUFFIX: &str = ".lock";

/// `path` with `suffix` appended to its file name.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// `<config_dir>/wordfilter/storage.json`, if the platform has a config dir.
pub fn default_store_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wordfilter").join("storage.json"))
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Records as last read or written by this process.
    last_seen: Mutex<Map<String, Value>>,
    tx: broadcast::Sender<StorageChange>,
}

impl FileStore {
    /// Opens the store at `path`. The file is created on first write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = read_records(&path)?;
        debug!("Opened file store at {} with {} record(s).", path.display(), records.len());
        let (tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            last_seen: Mutex::new(records),
            tx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the file and broadcasts a change for every record that differs
    /// from what this process last saw. Returns the changes sent.
    pub fn poll_external_change(&self) -> Result<Vec<StorageChange>> {
        let current = read_records(&self.path)?;
        let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);

        let mut changes = Vec::new();
        for (key, value) in &current {
            if last_seen.get(key) != Some(value) {
                changes.push(StorageChange {
                    key: key.clone(),
                    old_value: last_seen.get(key).cloned(),
                    new_value: Some(value.clone()),
                });
            }
        }
        for (key, value) in last_seen.iter() {
            if !current.contains_key(key) {
                changes.push(StorageChange {
                    key: key.clone(),
                    old_value: Some(value.clone()),
                    new_value: None,
                });
            }
        }
        *last_seen = current;
        drop(last_seen);

        for change in &changes {
            debug!("External change detected for record '{}'.", change.key);
            let _ = self.tx.send(change.clone());
        }
        Ok(changes)
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(WordFilterError::from)
                    .with_context(|| format!("Failed to create store directory {}", parent.display()))?;
            }
        }
        Ok(())
    }

    /// Takes the exclusive writer lock. It is released when the file drops.
    fn lock_for_update(&self) -> Result<File> {
        self.ensure_parent_dir()?;
        let lock_path = sibling_path(&self.path, STORE_FILE_LOCK_SUFFIX);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(WordFilterError::from)
            .with_context(|| format!("Failed to open store lock {}", lock_path.display()))?;
        fs2::FileExt::lock_exclusive(&lock)
            .map_err(WordFilterError::from)
            .with_context(|| format!("Failed to lock {}", lock_path.display()))?;
        Ok(lock)
    }

    /// Replaces the file contents. Callers hold the writer lock.
    fn write_records(&self, records: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_vec_pretty(records).context("Failed to serialize store records")?;
        let tmp_path = sibling_path(&self.path, STORE_FILE_TMP_SUFFIX);
        {
            let mut tmp = File::create(&tmp_path).map_err(WordFilterError::from)?;
            tmp.write_all(&json).map_err(WordFilterError::from)?;
            tmp.flush().map_err(WordFilterError::from)?;
        }
        fs::rename(&tmp_path, &self.path)
            .map_err(WordFilterError::from)
            .with_context(|| format!("Failed to replace store file {}", self.path.display()))?;
        Ok(())
    }
}

/// Reads all records. A missing or empty file is an empty map; a file that is
/// not a JSON object is logged and treated as empty.
fn read_records(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let mut f = File::open(path)
        .map_err(WordFilterError::from)
        .with_context(|| format!("Failed to open store file {}", path.display()))?;
    fs2::FileExt::lock_shared(&f).map_err(WordFilterError::from)?;
    let mut raw = Vec::new();
    let read_result = f.read_to_end(&mut raw);
    fs2::FileExt::unlock(&f).map_err(WordFilterError::from)?;
    read_result
        .map_err(WordFilterError::from)
        .with_context(|| format!("Failed to read store file {}", path.display()))?;

    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => {
            warn!("Store file {} is not a JSON object; treating it as empty.", path.display());
            Ok(Map::new())
        }
        Err(e) => {
            warn!("Store file {} is not valid JSON ({}); treating it as empty.", path.display(), e);
            Ok(Map::new())
        }
    }
}

impl RuleStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(read_records(&self.path)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.update(key, &mut |_| Some(value.clone())).map(|_| ())
    }

    fn update(&self, key: &str, edit: &mut dyn FnMut(Option<&Value>) -> Option<Value>) -> Result<bool> {
        let _lock = self.lock_for_update()?;
        let mut records = read_records(&self.path)?;
        let new_value = match edit(records.get(key)) {
            Some(value) => value,
            None => return Ok(false),
        };
        let old_value = records.insert(key.to_string(), new_value.clone());
        self.write_records(&records)?;
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = records;

        let _ = self.tx.send(StorageChange {
            key: key.to_string(),
            old_value,
            new_value: Some(new_value),
        });
        Ok(true)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.tx.subscribe()
    }
}

/// Polls `store` for writes made by other processes every `interval`.
pub fn spawn_store_watcher(store: Arc<FileStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = store.poll_external_change() {
                warn!("Failed to poll store file {}: {:#}", store.path().display(), e);
            }
        }
    })
}

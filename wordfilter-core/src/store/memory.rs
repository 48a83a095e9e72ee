// wordfilter-core/src/store/memory.rs
//! In-process `RuleStore`, used by hosts that persist elsewhere and by tests.

use anyhow::Result;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;

use super::{RuleStore, StorageChange, CHANGE_CHANNEL_CAPACITY};

#[derive(Debug)]
pub struct MemoryStore {
    records: Mutex<IndexMap<String, Value>>,
    tx: broadcast::Sender<StorageChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            records: Mutex::new(IndexMap::new()),
            tx,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.update(key, &mut |_| Some(value.clone())).map(|_| ())
    }

    fn update(&self, key: &str, edit: &mut dyn FnMut(Option<&Value>) -> Option<Value>) -> Result<bool> {
        let change = {
            let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            let new_value = match edit(records.get(key)) {
                Some(value) => value,
                None => return Ok(false),
            };
            let old_value = records.insert(key.to_string(), new_value.clone());
            StorageChange {
                key: key.to_string(),
                old_value,
                new_value: Some(new_value),
            }
        };
        // No subscribers is not an error.
        let _ = self.tx.send(change);
        Ok(true)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.tx.subscribe()
    }
}

// wordfilter-core/src/store.rs
//! The persisted rule store interface and rule-manager operations.
//!
//! A store is a key-value record. The rule set lives under `STORAGE_KEY` as a
//! JSON object mapping trigger to replacement. Every write is announced to
//! subscribers as a `StorageChange`, whichever writer made it, and consumers
//! rebuild their `RuleSet` wholesale from the new value.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::config::{RuleSet, UpsertOutcome, STORAGE_KEY};

pub mod file;
pub mod memory;

pub use file::{default_store_path, spawn_store_watcher, FileStore};
pub use memory::MemoryStore;

/// Capacity of each store's change channel.
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A single record update as seen by subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// Key-value persistence with change notification.
pub trait RuleStore: Send + Sync {
    /// Reads a record. A missing record is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Writes a record and notifies subscribers.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Read-modify-write of one record, atomic with respect to other writers
    /// of the same store. `edit` gets the current value and returns the value
    /// to write, or `None` to leave the record untouched. Returns whether a
    /// write happened.
    fn update(&self, key: &str, edit: &mut dyn FnMut(Option<&Value>) -> Option<Value>) -> Result<bool>;

    /// Subscribes to record updates, including those made by other writers.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

/// Loads the persisted rule set. A missing or malformed record is an empty set.
pub fn load_rules<S: RuleStore + ?Sized>(store: &S) -> Result<RuleSet> {
    let value = store
        .get(STORAGE_KEY)
        .with_context(|| format!("Failed to read '{}' from the rule store", STORAGE_KEY))?;
    Ok(RuleSet::from_store_value(value.as_ref()))
}

/// Persists `rules` under `STORAGE_KEY`.
pub fn save_rules<S: RuleStore + ?Sized>(store: &S, rules: &RuleSet) -> Result<()> {
    store
        .set(STORAGE_KEY, rules.to_store_value())
        .with_context(|| format!("Failed to write '{}' to the rule store", STORAGE_KEY))
}

/// Applies `edit` to the persisted rule set in a single store update. `edit`
/// returns its result and whether the edited set should be written.
fn modify_rules<S, T, F>(store: &S, edit: F) -> Result<T>
where
    S: RuleStore + ?Sized,
    F: FnOnce(&mut RuleSet) -> (T, bool),
{
    let mut edit = Some(edit);
    let mut result = None;
    store
        .update(STORAGE_KEY, &mut |current| {
            let edit = edit.take()?;
            let mut rules = RuleSet::from_store_value(current);
            let (value, write) = edit(&mut rules);
            result = Some(value);
            write.then(|| rules.to_store_value())
        })
        .with_context(|| format!("Failed to update '{}' in the rule store", STORAGE_KEY))?;
    result.ok_or_else(|| anyhow!("Rule store update of '{}' did not run", STORAGE_KEY))
}

/// Adds a rule, or updates the replacement of the rule whose trigger matches
/// case-insensitively. A blank word is rejected without writing.
pub fn add_rule<S: RuleStore + ?Sized>(store: &S, word: &str, replacement: &str) -> Result<UpsertOutcome> {
    let (outcome, count) = modify_rules(store, |rules| {
        let outcome = rules.upsert(word, replacement);
        let write = outcome != UpsertOutcome::Rejected;
        ((outcome, rules.len()), write)
    })?;
    match &outcome {
        UpsertOutcome::Rejected => debug!("add_rule rejected a blank word; store left untouched."),
        UpsertOutcome::Added => info!("Rule added. {} rule(s) stored.", count),
        UpsertOutcome::Updated(_) => info!("Rule updated. {} rule(s) stored.", count),
    }
    Ok(outcome)
}

/// Removes the rule stored under exactly `word`. Returns whether one existed.
pub fn delete_rule<S: RuleStore + ?Sized>(store: &S, word: &str) -> Result<bool> {
    let (removed, count) = modify_rules(store, |rules| {
        let removed = rules.remove(word);
        ((removed, rules.len()), removed)
    })?;
    if removed {
        info!("Rule deleted. {} rule(s) stored.", count);
    } else {
        debug!("delete_rule found no exact key match; store left untouched.");
    }
    Ok(removed)
}

/// Persists an empty rule set.
pub fn clear_rules<S: RuleStore + ?Sized>(store: &S) -> Result<()> {
    save_rules(store, &RuleSet::new())?;
    info!("All rules cleared.");
    Ok(())
}

/// Current persisted rule set, for display.
pub fn list_rules<S: RuleStore + ?Sized>(store: &S) -> Result<RuleSet> {
    load_rules(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_update_delete_clear() -> Result<()> {
        let store = MemoryStore::new();
        assert_eq!(add_rule(&store, " Bad ", "x")?, UpsertOutcome::Added);
        assert_eq!(add_rule(&store, "bad", "y")?, UpsertOutcome::Updated("Bad".to_string()));
        assert_eq!(store.get(STORAGE_KEY)?, Some(json!({ "Bad": "y" })));

        assert!(!delete_rule(&store, "bad")?);
        assert!(delete_rule(&store, "Bad")?);
        assert!(list_rules(&store)?.is_empty());

        add_rule(&store, "one", "")?;
        assert_eq!(list_rules(&store)?.get("one").unwrap().replacement, "[REDACTED]");
        clear_rules(&store)?;
        assert_eq!(store.get(STORAGE_KEY)?, Some(json!({})));
        Ok(())
    }

    #[test]
    fn test_blank_word_does_not_write() -> Result<()> {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        assert_eq!(add_rule(&store, "   ", "x")?, UpsertOutcome::Rejected);
        assert!(store.get(STORAGE_KEY)?.is_none());
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[test]
    fn test_malformed_record_loads_empty() -> Result<()> {
        let store = MemoryStore::new();
        store.set(STORAGE_KEY, json!(42))?;
        assert!(load_rules(&store)?.is_empty());
        Ok(())
    }
}

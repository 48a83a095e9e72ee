//! Rule configuration for `wordfilter-core`.
//!
//! This module defines the `Rule` and `RuleSet` types. A `RuleSet` maps a
//! trigger (stored with the casing it was first entered with) to its rule, and
//! compares triggers case-insensitively so that at most one rule exists per
//! case-folded trigger.
//!
//! A `RuleSet` is copy-on-write: `snapshot()` hands out a cheap clone that
//! later `upsert`/`remove`/`clear` calls on the original never touch, which
//! is what lets an engine read it for a whole substitution pass.
//!
//! License: MIT OR Apache-2.0

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::validators::{check_trigger, effective_replacement, normalize_replacement, TriggerCheck};

/// Name of the persisted record holding the serialized `RuleSet`.
pub const STORAGE_KEY: &str = "wordReplacements";

/// Placeholder substituted when a rule has no replacement text.
pub const DEFAULT_REPLACEMENT: &str = "[REDACTED]";

/// A single word -> replacement rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// The word or phrase searched for.
    pub trigger: String,
    /// The text spliced in place of a match. May be empty, in which case
    /// `DEFAULT_REPLACEMENT` is used.
    pub replacement: String,
}

impl Rule {
    pub fn new(trigger: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            replacement: replacement.into(),
        }
    }

    /// The replacement text actually spliced into the buffer.
    pub fn effective_replacement(&self) -> &str {
        effective_replacement(&self.replacement)
    }
}

/// Result of `RuleSet::upsert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new entry was inserted.
    Added,
    /// An existing entry (matched case-insensitively) had its replacement
    /// overwritten. Carries the stored trigger, whose casing is kept.
    Updated(String),
    /// The trigger was blank; nothing changed.
    Rejected,
}

/// The active collection of trigger -> replacement rules.
///
/// Serializes as a JSON object `{ trigger: replacement, ... }`, which is the
/// shape of the `wordReplacements` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, String>", into = "IndexMap<String, String>")]
pub struct RuleSet {
    entries: Arc<IndexMap<String, Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates rules in the set's own order, which is the order engines
    /// process them in.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.entries.values()
    }

    /// Stored triggers, in iteration order.
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Exact-key lookup.
    pub fn get(&self, trigger: &str) -> Option<&Rule> {
        self.entries.get(trigger)
    }

    /// Returns the stored trigger whose case-folded form equals `trigger`'s.
    pub fn find_case_insensitive(&self, trigger: &str) -> Option<&str> {
        let folded = trigger.to_lowercase();
        self.entries
            .keys()
            .find(|k| k.to_lowercase() == folded)
            .map(String::as_str)
    }

    /// Inserts or updates a rule.
    ///
    /// Both values are trimmed and an empty replacement becomes
    /// `DEFAULT_REPLACEMENT`. An existing entry is matched case-insensitively
    /// and keeps its stored casing and position. A blank trigger is a silent
    /// no-op.
    pub fn upsert(&mut self, trigger: &str, replacement: &str) -> UpsertOutcome {
        if check_trigger(trigger) == TriggerCheck::Blank {
            debug!("Ignoring upsert with a blank trigger.");
            return UpsertOutcome::Rejected;
        }
        self.upsert_exact(trigger.trim(), normalize_replacement(replacement))
    }

    /// Case-insensitive upsert without trimming or defaulting. Used when
    /// rebuilding from a persisted value, whose keys must stay byte-exact.
    fn upsert_exact(&mut self, trigger: &str, replacement: String) -> UpsertOutcome {
        let existing = self.find_case_insensitive(trigger).map(str::to_string);
        let entries = Arc::make_mut(&mut self.entries);
        match existing {
            Some(stored) => {
                if let Some(rule) = entries.get_mut(&stored) {
                    rule.replacement = replacement;
                }
                UpsertOutcome::Updated(stored)
            }
            None => {
                entries.insert(trigger.to_string(), Rule::new(trigger, replacement));
                UpsertOutcome::Added
            }
        }
    }

    /// Deletes the entry whose stored key exactly equals `trigger`.
    pub fn remove(&mut self, trigger: &str) -> bool {
        if !self.entries.contains_key(trigger) {
            return false;
        }
        Arc::make_mut(&mut self.entries).shift_remove(trigger).is_some()
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.entries = Arc::new(IndexMap::new());
        }
    }

    /// A read-only view for one substitution pass. Later mutations of `self`
    /// do not affect the returned set.
    pub fn snapshot(&self) -> RuleSet {
        self.clone()
    }

    /// Rebuilds a `RuleSet` from a persisted record.
    ///
    /// A missing or non-object value yields an empty set. Non-string
    /// replacement values are treated as absent.
    pub fn from_store_value(value: Option<&Value>) -> Self {
        let mut set = RuleSet::new();
        let map = match value {
            None | Some(Value::Null) => return set,
            Some(Value::Object(map)) => map,
            Some(other) => {
                warn!(
                    "Persisted '{}' is not a mapping (found {}); treating it as empty.",
                    STORAGE_KEY,
                    json_kind(other)
                );
                return set;
            }
        };

        for (trigger, replacement) in map {
            if check_trigger(trigger) == TriggerCheck::Blank {
                warn!("Skipping persisted rule with a blank trigger.");
                continue;
            }
            let replacement = match replacement {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => {
                    warn!(
                        "Persisted replacement is a {}, not a string; using the placeholder.",
                        json_kind(other)
                    );
                    String::new()
                }
            };
            set.upsert_exact(trigger, replacement);
        }
        debug!("Rebuilt rule set with {} rules from the store.", set.len());
        set
    }

    /// Serializes the set into the `wordReplacements` record shape.
    pub fn to_store_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, rule)| (k.clone(), Value::String(rule.replacement.clone())))
                .collect(),
        )
    }
}

impl Hash for RuleSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.len().hash(state);
        for rule in self.entries.values() {
            rule.hash(state);
        }
    }
}

impl From<IndexMap<String, String>> for RuleSet {
    fn from(map: IndexMap<String, String>) -> Self {
        let mut set = RuleSet::new();
        for (trigger, replacement) in map {
            if check_trigger(&trigger) != TriggerCheck::Blank {
                set.upsert_exact(&trigger, replacement);
            }
        }
        set
    }
}

impl From<RuleSet> for IndexMap<String, String> {
    fn from(set: RuleSet) -> Self {
        set.entries
            .iter()
            .map(|(k, rule)| (k.clone(), rule.replacement.clone()))
            .collect()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for RuleSet {
    /// Builds a set through `upsert`, so later pairs overwrite earlier ones
    /// case-insensitively.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        for (trigger, replacement) in iter {
            set.upsert(trigger.as_ref(), replacement.as_ref());
        }
        set
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upsert_is_case_insensitive_overwrite() {
        let mut set = RuleSet::new();
        assert_eq!(set.upsert("Bad", "x"), UpsertOutcome::Added);
        assert_eq!(set.upsert("bad", "y"), UpsertOutcome::Updated("Bad".to_string()));
        assert_eq!(set.len(), 1);
        let rule = set.get("Bad").unwrap();
        assert_eq!(rule.trigger, "Bad");
        assert_eq!(rule.replacement, "y");
        assert!(set.get("bad").is_none());
    }

    #[test]
    fn test_upsert_trims_and_defaults() {
        let mut set = RuleSet::new();
        set.upsert("  secret ", "   ");
        assert_eq!(set.get("secret").unwrap().replacement, DEFAULT_REPLACEMENT);
        assert_eq!(set.upsert("   ", "x"), UpsertOutcome::Rejected);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_long_trigger_is_stored_and_kept_on_reload() {
        let long = "w".repeat(501);
        let mut set = RuleSet::new();
        assert_eq!(set.upsert(&long, "short"), UpsertOutcome::Added);
        assert_eq!(set.get(&long).unwrap().replacement, "short");

        let reloaded = RuleSet::from_store_value(Some(&set.to_store_value()));
        assert_eq!(reloaded.triggers().collect::<Vec<_>>(), vec![long.as_str()]);
        let map: IndexMap<String, String> = [(long.clone(), "short".to_string())].into_iter().collect();
        assert_eq!(RuleSet::from(map).len(), 1);
    }

    #[test]
    fn test_remove_requires_exact_key() {
        let mut set: RuleSet = [("Bad", "nice")].into_iter().collect();
        assert!(!set.remove("bad"));
        assert!(set.remove("Bad"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_mutation() {
        let mut set: RuleSet = [("one", "1"), ("two", "2")].into_iter().collect();
        let snap = set.snapshot();
        set.upsert("three", "3");
        set.remove("one");
        assert_eq!(snap.triggers().collect::<Vec<_>>(), vec!["one", "two"]);
        set.clear();
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn test_update_keeps_position() {
        let mut set: RuleSet = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        set.upsert("B", "two");
        assert_eq!(set.triggers().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(set.get("b").unwrap().replacement, "two");
    }

    #[test]
    fn test_from_store_value_malformed_is_empty() {
        assert!(RuleSet::from_store_value(None).is_empty());
        assert!(RuleSet::from_store_value(Some(&json!(null))).is_empty());
        assert!(RuleSet::from_store_value(Some(&json!(["bad"]))).is_empty());
        assert!(RuleSet::from_store_value(Some(&json!("bad"))).is_empty());
    }

    #[test]
    fn test_from_store_value_keeps_order_and_tolerates_bad_values() {
        let value = json!({ "zeta": "z", "alpha": 5, "  ": "blank", "mid": null });
        let set = RuleSet::from_store_value(Some(&value));
        assert_eq!(set.triggers().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(set.get("alpha").unwrap().effective_replacement(), DEFAULT_REPLACEMENT);
        assert_eq!(set.get("mid").unwrap().replacement, "");
    }

    #[test]
    fn test_store_value_serde_shape() {
        let set: RuleSet = [("bad", "nice"), ("hi", "hello")].into_iter().collect();
        let value = set.to_store_value();
        assert_eq!(value, json!({ "bad": "nice", "hi": "hello" }));
        let via_serde: RuleSet = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(via_serde, set);
        assert_eq!(serde_json::to_value(&set).unwrap(), value);
    }
}

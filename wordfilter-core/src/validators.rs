// File: wordfilter-core/src/validators.rs
//! Programmatic validation for rule triggers and replacements.
//!
//! These checks run before a rule enters a `RuleSet` and again when rules are
//! compiled, so that values written to the store by another writer are held
//! to the same constraints as values written through `RuleSet::upsert`.
//!
//! License: MIT OR APACHE 2.0

use crate::config::DEFAULT_REPLACEMENT;

/// Outcome of validating a candidate trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerCheck {
    Valid,
    /// The trigger is empty once surrounding whitespace is removed.
    Blank,
}

/// Checks a trigger against the rule invariants. Any trigger with a
/// non-whitespace character is valid, however long.
pub fn check_trigger(trigger: &str) -> TriggerCheck {
    if trigger.trim().is_empty() {
        TriggerCheck::Blank
    } else {
        TriggerCheck::Valid
    }
}

/// Returns `true` if the trigger may be stored in a `RuleSet`.
pub fn is_valid_trigger(trigger: &str) -> bool {
    check_trigger(trigger) == TriggerCheck::Valid
}

/// Returns the replacement to splice in for a stored value.
///
/// Empty values fall back to the `[REDACTED]` placeholder.
pub fn effective_replacement(replacement: &str) -> &str {
    if replacement.is_empty() {
        DEFAULT_REPLACEMENT
    } else {
        replacement
    }
}

/// Normalizes user-entered replacement text: trims it and substitutes the
/// placeholder when nothing remains.
pub fn normalize_replacement(replacement: &str) -> String {
    let trimmed = replacement.trim();
    if trimmed.is_empty() {
        DEFAULT_REPLACEMENT.to_string()
    } else {
        trimmed.to_string()
    }
}

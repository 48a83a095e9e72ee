// wordfilter-core/src/substitution_match.rs
//! Reporting types for substitutions and PII-aware debug logging.
//!
//! Text typed into a web form is user data. Debug logs show matched text only
//! when `WORDFILTER_ALLOW_DEBUG_PII=true` is set in the environment.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Read once: whether user text may appear verbatim in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("WORDFILTER_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// Per-trigger tally of one engine pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionSummaryItem {
    pub trigger: String,
    pub replacement: String,
    pub occurrences: usize,
}

/// Adds `count` occurrences of `trigger` to `summary`, merging with an
/// existing entry for the same trigger.
pub fn record_occurrences(
    summary: &mut Vec<SubstitutionSummaryItem>,
    trigger: &str,
    replacement: &str,
    count: usize,
) {
    if count == 0 {
        return;
    }
    if let Some(item) = summary.iter_mut().find(|i| i.trigger == trigger) {
        item.occurrences += count;
        return;
    }
    summary.push(SubstitutionSummaryItem {
        trigger: trigger.to_string(),
        replacement: replacement.to_string(),
        occurrences: count,
    });
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    let len = s.chars().count();
    if len <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", len)
    }
}

/// `s` if PII logging is allowed, a placeholder otherwise.
pub fn loggable(s: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        s.to_string()
    } else {
        redact_sensitive(s)
    }
}

pub fn log_substitution_debug(engine: &str, trigger: &str, replacement: &str, occurrences: usize) {
    debug!(
        "{} Replaced '{}' with '{}' ({} occurrence(s))",
        engine,
        loggable(trigger),
        loggable(replacement),
        occurrences
    );
}

// wordfilter-core/src/lib.rs
//! # wordfilter Core Library
//!
//! `wordfilter-core` rewrites configured words and phrases in editable text as
//! it is typed or pasted, keeping the caret where the user expects it. It has
//! no UI or DOM dependency: a host hands the core a text value plus a cursor
//! offset, and writes the result back to the live element.
//!
//! ## Modules
//!
//! * `config`: `Rule` and `RuleSet`, the case-insensitive trigger -> replacement map.
//! * `validators`: Trigger and replacement checks.
//! * `buffer`: `EditBuffer` and UTF-16 offset mapping.
//! * `patterns`: Whole-word pattern construction and the compiled-rule cache.
//! * `engine`: The `SubstitutionEngine` trait.
//! * `engines`: Plain-text and rich-text engine implementations.
//! * `substitution_match`: Per-trigger summaries and PII-aware debug logging.
//! * `store`: The persisted rule store interface, memory and file stores, and
//!   rule-manager operations.
//! * `adapter`: Buffer adapter traits for text fields and rich-text containers.
//! * `scheduling`: Paste deferral and mutation debounce policies.
//! * `filter`: `TextFilter`, which ties store, snapshot and engines to edit events.
//! * `headless`: One-shot helpers for filtering a string.
//!
//! ## Usage Example
//!
//! ```rust
//! use wordfilter_core::{headless_filter_string, HeadlessEngineType, RuleSet};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let mut rules = RuleSet::new();
//!     rules.upsert("bad", "nice");
//!
//!     let out = headless_filter_string(&rules, "this is bad", Some(11), HeadlessEngineType::PlainText)?;
//!     assert_eq!(out.buffer.text, "this is nice");
//!     assert_eq!(out.buffer.cursor, 12);
//!     assert!(out.changed);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return `anyhow::Result`; library-specific failures are
//! `WordFilterError`. Empty text, an empty rule set and blank triggers are
//! no-ops rather than errors, and a malformed persisted record loads as an
//! empty rule set.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod adapter;
pub mod buffer;
pub mod config;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod filter;
pub mod headless;
pub mod patterns;
pub mod scheduling;
pub mod store;
pub mod substitution_match;
pub mod validators;

/// Re-exports the rule types and their constants.
pub use config::{
    Rule,
    RuleSet,
    UpsertOutcome,
    DEFAULT_REPLACEMENT,
    STORAGE_KEY,
};

pub use errors::WordFilterError;

pub use buffer::{utf16_len, EditBuffer};

/// Re-exports the engine trait and both implementations.
pub use engine::{Substitution, SubstitutionEngine};
pub use engines::plain_text::PlainTextEngine;
pub use engines::rich_text::RichTextEngine;

pub use substitution_match::SubstitutionSummaryItem;

/// Re-exports the store interface, implementations and rule-manager operations.
pub use store::{
    add_rule,
    clear_rules,
    default_store_path,
    delete_rule,
    list_rules,
    load_rules,
    save_rules,
    spawn_store_watcher,
    FileStore,
    MemoryStore,
    RuleStore,
    StorageChange,
};

pub use adapter::{MemoryRichText, MemoryTextField, RichTextAdapter, TextFieldAdapter};
pub use filter::{EditEvent, TextFilter};
pub use scheduling::{FilterOptions, MutationDebouncer, PASTE_SETTLE_DELAY};

pub use headless::{headless_filter_string, HeadlessEngineType};

pub use patterns::compiler::{compile_rules, get_or_compile_rules, BoundaryMode, CompiledRule, CompiledRules};

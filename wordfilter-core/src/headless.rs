// File: wordfilter-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for using the engines without a live element.
//! Provides a one-shot filter over a string, selecting the engine by type.

use anyhow::Result;

use crate::buffer::EditBuffer;
use crate::config::RuleSet;
use crate::engine::{Substitution, SubstitutionEngine};
use crate::engines::plain_text::PlainTextEngine;
use crate::engines::rich_text::RichTextEngine;

/// Selects which engine `headless_filter_string` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessEngineType {
    PlainText,
    RichText,
}

/// Filters `text` once with `rules`.
///
/// # Arguments
///
/// * `rules` - The rule set to apply.
/// * `text` - The text to filter.
/// * `cursor` - Caret offset in UTF-16 code units; `None` places it at the end.
/// * `engine_type` - Which engine to use.
pub fn headless_filter_string(
    rules: &RuleSet,
    text: &str,
    cursor: Option<usize>,
    engine_type: HeadlessEngineType,
) -> Result<Substitution> {
    let engine: Box<dyn SubstitutionEngine> = match engine_type {
        HeadlessEngineType::PlainText => Box::new(PlainTextEngine::new()),
        HeadlessEngineType::RichText => Box::new(RichTextEngine::new()),
    };

    let buffer = match cursor {
        Some(cursor) => EditBuffer::new(text, cursor),
        None => EditBuffer::at_end(text),
    };
    engine.substitute(&buffer, rules)
}

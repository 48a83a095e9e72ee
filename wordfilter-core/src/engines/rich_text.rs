// wordfilter-core/src/engines/rich_text.rs
//! A `SubstitutionEngine` for content-editable containers.
//!
//! Each rule is a single global replace-all over the current text with
//! symmetric whole-word boundaries. No per-match offset bookkeeping is done;
//! the returned cursor is the original offset clamped to the new length, and
//! the adapter restores it on a best-effort basis.
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use regex::NoExpand;

use crate::buffer::{utf16_len, EditBuffer};
use crate::config::RuleSet;
use crate::engine::{Substitution, SubstitutionEngine};
use crate::patterns::compiler::{get_or_compile_rules, BoundaryMode};
use crate::substitution_match::{log_substitution_debug, record_occurrences};

#[derive(Debug, Default, Clone, Copy)]
pub struct RichTextEngine;

impl RichTextEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SubstitutionEngine for RichTextEngine {
    fn name(&self) -> &'static str {
        "[rich_text]"
    }

    fn boundary(&self) -> BoundaryMode {
        BoundaryMode::Strict
    }

    fn substitute(&self, buffer: &EditBuffer, rules: &RuleSet) -> Result<Substitution> {
        if buffer.text.is_empty() || rules.is_empty() {
            return Ok(Substitution::unchanged(buffer));
        }

        let compiled = get_or_compile_rules(rules, self.boundary())?;
        let mut text = buffer.text.clone();
        let mut summary = Vec::new();

        for rule in &compiled.rules {
            let occurrences = rule.regex.find_iter(&text).count();
            if occurrences == 0 {
                continue;
            }
            // Replacement text is literal; `$` carries no group meaning here.
            text = rule
                .regex
                .replace_all(&text, NoExpand(rule.replacement.as_str()))
                .into_owned();
            log_substitution_debug(self.name(), &rule.trigger, &rule.replacement, occurrences);
            record_occurrences(&mut summary, &rule.trigger, &rule.replacement, occurrences);
        }

        if summary.is_empty() {
            return Ok(Substitution::unchanged(buffer));
        }

        let cursor = buffer.cursor.min(utf16_len(&text));
        Ok(Substitution {
            buffer: EditBuffer { text, cursor },
            changed: true,
            summary,
        })
    }
}

// wordfilter-core/src/engine.rs
//! Defines the core `SubstitutionEngine` trait and its result type.
//!
//! An engine is a pure function of an `EditBuffer` and a `RuleSet`: it holds
//! no state between calls, never blocks, and is safe to re-run on every
//! keystroke because each call recomputes from its inputs. Two engines exist,
//! one per editing model of the host element.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;

use crate::buffer::EditBuffer;
use crate::config::RuleSet;
use crate::patterns::compiler::BoundaryMode;
use crate::substitution_match::SubstitutionSummaryItem;

/// Output of one engine pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// The rewritten text and the cursor to place in it.
    pub buffer: EditBuffer,
    /// `true` if any rule matched.
    pub changed: bool,
    /// Per-trigger counts, in rule order.
    pub summary: Vec<SubstitutionSummaryItem>,
}

impl Substitution {
    /// A result that hands the input back untouched.
    pub fn unchanged(buffer: &EditBuffer) -> Self {
        Self {
            buffer: buffer.clone(),
            changed: false,
            summary: Vec::new(),
        }
    }
}

/// Pluggable substitution strategy.
pub trait SubstitutionEngine: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// The trigger boundary flavour this engine compiles rules with.
    fn boundary(&self) -> BoundaryMode;

    /// Applies every rule of `rules` to `buffer`, in the rule set's order.
    ///
    /// # Arguments
    /// * `buffer` - Current text and cursor (UTF-16 code units) of the element.
    /// * `rules` - A snapshot of the active rule set, read-only for this pass.
    fn substitute(&self, buffer: &EditBuffer, rules: &RuleSet) -> Result<Substitution>;
}

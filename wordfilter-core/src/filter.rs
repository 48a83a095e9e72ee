// wordfilter-core/src/filter.rs
//! `TextFilter` wires the rule store, the current rule snapshot and both
//! engines to the edit events of a host element.
//!
//! The filter owns the only mutable state in the core: the `RuleSet`
//! snapshot, replaced wholesale whenever the store reports a change to
//! `STORAGE_KEY`, and the mutation debouncer. Everything runs on the caller's
//! thread; paste deferral and debounce are the only suspension points.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use log::{debug, info, warn};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::sleep;

use crate::adapter::{RichTextAdapter, TextFieldAdapter};
use crate::config::{RuleSet, STORAGE_KEY};
use crate::engine::SubstitutionEngine;
use crate::engines::plain_text::PlainTextEngine;
use crate::engines::rich_text::RichTextEngine;
use crate::scheduling::{FilterOptions, MutationDebouncer};
use crate::store::{load_rules, RuleStore, StorageChange};

/// Edit events a host element forwards to the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    Input,
    KeyUp,
    /// Deferred by `FilterOptions::paste_delay` before filtering.
    Paste,
    /// A structural change inside a rich-text container. Debounced.
    Mutation,
}

#[derive(Debug)]
pub struct TextFilter {
    rules: RuleSet,
    plain: PlainTextEngine,
    rich: RichTextEngine,
    options: FilterOptions,
    debouncer: MutationDebouncer,
}

impl TextFilter {
    pub fn new(rules: RuleSet, options: FilterOptions) -> Self {
        Self {
            rules,
            plain: PlainTextEngine::new(),
            rich: RichTextEngine::new(),
            debouncer: MutationDebouncer::new(options.mutation_debounce),
            options,
        }
    }

    /// Builds a filter from the persisted rule set.
    pub fn from_store<S: RuleStore + ?Sized>(store: &S, options: FilterOptions) -> Result<Self> {
        let rules = load_rules(store)?;
        info!("Text filter loaded with {} rule(s).", rules.len());
        Ok(Self::new(rules, options))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn replace_rules(&mut self, rules: RuleSet) {
        debug!("Rule snapshot replaced: {} -> {} rule(s).", self.rules.len(), rules.len());
        self.rules = rules;
    }

    /// Rebuilds the rule snapshot if `change` concerns `STORAGE_KEY`.
    pub fn apply_change(&mut self, change: &StorageChange) -> bool {
        if change.key != STORAGE_KEY {
            return false;
        }
        self.replace_rules(RuleSet::from_store_value(change.new_value.as_ref()));
        true
    }

    /// Applies every change queued on `rx` without waiting. Returns how many
    /// rebuilt the snapshot.
    pub fn drain_changes(&mut self, rx: &mut broadcast::Receiver<StorageChange>) -> usize {
        let mut applied = 0;
        loop {
            match rx.try_recv() {
                Ok(change) => {
                    if self.apply_change(&change) {
                        applied += 1;
                    }
                }
                // Later messages still carry the full record; keep reading.
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Rule change subscriber lagged; {} change(s) skipped.", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        applied
    }

    /// Runs the plain-text engine over `adapter` and writes back a changed
    /// result. Returns whether the field was rewritten.
    pub fn filter_text_field(&self, adapter: &mut dyn TextFieldAdapter) -> bool {
        let buffer = adapter.read();
        let result = match self.plain.substitute(&buffer, &self.rules) {
            Ok(result) => result,
            Err(e) => {
                warn!("Plain-text substitution failed; field left as is: {:#}", e);
                return false;
            }
        };
        if !result.changed {
            return false;
        }
        adapter.apply(&result.buffer);
        adapter.notify_changed();
        true
    }

    /// Runs the rich-text engine over `adapter`. Cursor restoration failures
    /// are logged and dropped.
    pub fn filter_rich_text(&self, adapter: &mut dyn RichTextAdapter) -> bool {
        let buffer = adapter.read();
        let result = match self.rich.substitute(&buffer, &self.rules) {
            Ok(result) => result,
            Err(e) => {
                warn!("Rich-text substitution failed; content left as is: {:#}", e);
                return false;
            }
        };
        if !result.changed {
            return false;
        }
        adapter.set_text(&result.buffer.text);
        adapter.notify_changed();
        if let Err(e) = adapter.restore_cursor(result.buffer.cursor) {
            debug!("Could not restore cursor position: {:#}", e);
        }
        true
    }

    /// Handles an edit event on a plain text field.
    pub async fn on_text_field_event(&self, event: EditEvent, adapter: &mut dyn TextFieldAdapter) -> bool {
        match event {
            EditEvent::Input | EditEvent::KeyUp => self.filter_text_field(adapter),
            EditEvent::Paste => {
                sleep(self.options.paste_delay).await;
                self.filter_text_field(adapter)
            }
            // Text fields have no child mutations to observe.
            EditEvent::Mutation => false,
        }
    }

    /// Handles an edit event on a rich-text container. Mutations only arm the
    /// debouncer; call `flush_mutations` to run the coalesced pass.
    pub async fn on_rich_text_event(&mut self, event: EditEvent, adapter: &mut dyn RichTextAdapter) -> bool {
        match event {
            EditEvent::Input | EditEvent::KeyUp => self.filter_rich_text(adapter),
            EditEvent::Paste => {
                sleep(self.options.paste_delay).await;
                self.filter_rich_text(adapter)
            }
            EditEvent::Mutation => {
                self.record_mutation();
                false
            }
        }
    }

    /// Arms the mutation debouncer without running the engine.
    pub fn record_mutation(&mut self) {
        self.debouncer.record();
    }

    pub fn has_pending_mutations(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Waits out the debounce window of a pending mutation burst, then runs
    /// one rich-text pass for the whole burst.
    pub async fn flush_mutations(&mut self, adapter: &mut dyn RichTextAdapter) -> bool {
        match self.debouncer.settle().await {
            Some(coalesced) => {
                debug!("Running one rich-text pass for {} coalesced mutation(s).", coalesced);
                self.filter_rich_text(adapter)
            }
            None => false,
        }
    }
}

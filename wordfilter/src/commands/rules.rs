// wordfilter/src/commands/rules.rs
//! Rule-manager subcommands: `add`, `remove`, `list` and `clear`.
//!
//! Every write goes through the core rule-manager operations, so running
//! filters watching the same store see the change.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::io::{self, BufRead, Write};

use wordfilter_core::store::RuleStore;
use wordfilter_core::validators::{check_trigger, TriggerCheck};
use wordfilter_core::{add_rule, clear_rules, delete_rule, list_rules, UpsertOutcome};

use super::{info_msg, success_msg};
use crate::errors::CliError;
use crate::ui::output_format::styled;
use crate::ui::rule_table::build_rule_table;
use crate::ui::theme::{ThemeEntry, ThemeMap};

pub const CLEAR_CONFIRM_PROMPT: &str = "Are you sure you want to clear all filtered words?";

/// Options shared by the rule-manager subcommands.
pub struct RuleCommandOptions<'a> {
    pub theme: &'a ThemeMap,
    pub quiet: bool,
}

impl RuleCommandOptions<'_> {
    fn success(&self, msg: &str) {
        if !self.quiet {
            success_msg(msg, self.theme);
        }
    }
}

/// Adds `word`, or updates its replacement if it is already stored under any
/// casing.
pub fn run_add(store: &dyn RuleStore, word: &str, replacement: &str, opts: &RuleCommandOptions) -> Result<()> {
    if check_trigger(word) == TriggerCheck::Blank {
        return Err(CliError::EmptyWord.into());
    }

    match add_rule(store, word, replacement)? {
        UpsertOutcome::Added => opts.success("Word added successfully!"),
        UpsertOutcome::Updated(stored) => {
            debug!("Updated existing rule stored as '{}'.", stored);
            opts.success("Word updated successfully!");
        }
        // Unreachable after check_trigger, but never write on rejection.
        UpsertOutcome::Rejected => return Err(CliError::EmptyWord.into()),
    }
    Ok(())
}

/// Removes the rule stored under exactly `word`.
pub fn run_remove(store: &dyn RuleStore, word: &str, opts: &RuleCommandOptions) -> Result<()> {
    if !delete_rule(store, word)? {
        return Err(CliError::WordNotFound(word.to_string()).into());
    }
    opts.success("Word deleted");
    Ok(())
}

/// Prints the stored rules to `writer`, as a table or as the raw JSON mapping.
pub fn run_list<W: Write>(store: &dyn RuleStore, json: bool, writer: &mut W, supports_color: bool) -> Result<()> {
    let rules = list_rules(store)?;
    if json {
        let rendered = serde_json::to_string_pretty(&rules.to_store_value())
            .context("Failed to serialize the rule list")?;
        writeln!(writer, "{}", rendered)?;
        return Ok(());
    }
    if rules.is_empty() {
        writeln!(writer, "No words added yet")?;
        return Ok(());
    }
    writeln!(writer, "{}", build_rule_table(&rules, supports_color))?;
    Ok(())
}

/// Clears every rule, asking first unless `yes` is set.
pub fn run_clear(store: &dyn RuleStore, yes: bool, opts: &RuleCommandOptions) -> Result<()> {
    if !yes {
        let stdin = io::stdin();
        let confirmed = confirm(
            &mut stdin.lock(),
            &mut io::stderr(),
            CLEAR_CONFIRM_PROMPT,
            opts.theme,
            io::stderr().is_terminal(),
        )
        .context("Failed to read confirmation input.")?;
        if !confirmed {
            info!("Clear cancelled by user.");
            info_msg("Nothing cleared.", opts.theme);
            return Ok(());
        }
    }
    clear_rules(store)?;
    opts.success("All words cleared");
    Ok(())
}

/// Asks a yes/no question. Only `y` or `yes` (any case) confirms.
pub fn confirm<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    prompt: &str,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<bool> {
    write!(writer, "{} (y/N): ", styled(prompt, ThemeEntry::Prompt, theme, supports_color))?;
    writer.flush()?;
    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

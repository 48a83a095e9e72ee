// wordfilter/src/commands/filter.rs
//! The `filter` subcommand: runs one engine pass over a file or stdin.
//!
//! Filtered text goes to stdout; the new cursor and the optional summary go
//! to stderr so the output can be piped.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io::{self, Read, Write};

use wordfilter_core::store::RuleStore;
use wordfilter_core::{headless_filter_string, load_rules, RuleSet, Substitution};

use super::{info_msg, warn_msg};
use crate::cli::FilterCommand;
use crate::errors::CliError;
use crate::ui::substitution_summary;
use crate::ui::theme::ThemeMap;

/// Reads the input named by `cmd`, minus one trailing line break.
pub fn read_input(cmd: &FilterCommand) -> Result<String> {
    let mut input = match &cmd.input_file {
        Some(path) => {
            info!("Reading input from file: {}", path.display());
            fs::read_to_string(path).with_context(|| CliError::InputUnreadable(path.clone()))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read input from stdin")?;
            buf
        }
    };
    if input.ends_with('\n') {
        input.pop();
        if input.ends_with('\r') {
            input.pop();
        }
    }
    Ok(input)
}

/// Filters `input` with `rules` using the engine selected by `cmd`.
pub fn filter_input(rules: &RuleSet, input: &str, cmd: &FilterCommand) -> Result<Substitution> {
    debug!("Filtering {} byte(s) with {} rule(s) in {:?} mode.", input.len(), rules.len(), cmd.mode);
    headless_filter_string(rules, input, cmd.cursor, cmd.mode.into()).context("Filtering failed")
}

pub fn run_filter(store: &dyn RuleStore, cmd: &FilterCommand, theme: &ThemeMap, quiet: bool) -> Result<()> {
    let rules = load_rules(store)?;
    if rules.is_empty() && !quiet {
        warn_msg("No words added yet", theme);
    }
    let input = read_input(cmd)?;
    let result = filter_input(&rules, &input, cmd)?;

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    writeln!(writer, "{}", result.buffer.text)?;
    writer.flush()?;

    if !quiet {
        info_msg(format!("Cursor: {}", result.buffer.cursor), theme);
    }
    if cmd.summary {
        let stderr_supports_color = io::stderr().is_terminal();
        substitution_summary::print_summary(&result.summary, &mut io::stderr(), theme, stderr_supports_color)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::FilterMode;

    fn command(mode: FilterMode, cursor: Option<usize>) -> FilterCommand {
        FilterCommand {
            input_file: None,
            cursor,
            mode,
            summary: false,
        }
    }

    #[test]
    fn plain_mode_tracks_cursor() -> Result<()> {
        let rules: RuleSet = [("bad", "nice")].into_iter().collect();
        let out = filter_input(&rules, "this is bad", &command(FilterMode::Plain, None))?;
        assert_eq!(out.buffer.text, "this is nice");
        assert_eq!(out.buffer.cursor, 12);
        Ok(())
    }

    #[test]
    fn rich_mode_uses_strict_boundaries() -> Result<()> {
        let rules: RuleSet = [("bad", "fine")].into_iter().collect();
        let out = filter_input(&rules, "bad, bad", &command(FilterMode::Rich, Some(0)))?;
        assert_eq!(out.buffer.text, "fine, fine");
        assert_eq!(out.summary[0].occurrences, 2);
        Ok(())
    }

    #[test]
    fn read_input_strips_one_line_break() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("input.txt");
        fs::write(&path, "line one\r\n")?;
        let cmd = FilterCommand {
            input_file: Some(path),
            ..command(FilterMode::Plain, None)
        };
        assert_eq!(read_input(&cmd)?, "line one");
        Ok(())
    }
}

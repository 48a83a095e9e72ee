// wordfilter/src/cli.rs
//! This file defines the command-line interface (CLI) for the wordfilter
//! application, including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use wordfilter_core::HeadlessEngineType;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "wordfilter",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Manage word replacement rules and filter text with them",
    long_about = "wordfilter keeps a list of words and phrases together with the text that should replace them, and rewrites any text you give it accordingly. Matching is whole-word and case-insensitive. The rule list is the same JSON store the live text filter reads, so changes made here are picked up by running filters.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Path of the rule store file.
    #[arg(
        long = "store",
        value_name = "FILE",
        env = "WORDFILTER_STORE",
        global = true,
        help = "Path of the JSON rule store (defaults to <config dir>/wordfilter/storage.json)."
    )]
    pub store: Option<PathBuf>,

    /// Specify the path to a custom JSON theme file.
    #[arg(long = "theme", value_name = "FILE", global = true, help = "Specify the path to a custom JSON theme file.")]
    pub theme: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `wordfilter` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Adds a word, or updates the replacement of an existing one.
    #[command(about = "Add a word to filter, or update its replacement.")]
    Add {
        /// The word or phrase to filter.
        #[arg(value_name = "WORD")]
        word: String,

        /// Replacement text (defaults to [REDACTED]).
        #[arg(value_name = "REPLACEMENT")]
        replacement: Option<String>,
    },

    /// Removes a word. The match is exact, including case.
    #[command(about = "Remove a word from the filter list.")]
    Remove {
        #[arg(value_name = "WORD")]
        word: String,
    },

    /// Lists the stored words in the order they were added.
    #[command(about = "List the filtered words and their replacements.")]
    List {
        /// Print the stored mapping as JSON instead of a table.
        #[arg(long = "json", help = "Print the stored mapping as JSON instead of a table.")]
        json: bool,
    },

    /// Removes every stored word.
    #[command(about = "Remove all filtered words.")]
    Clear {
        /// Proceed without confirmation.
        #[arg(long, short = 'y', help = "Clear without a confirmation prompt.")]
        yes: bool,
    },

    /// Filters text with the stored rules.
    #[command(about = "Filter an input file or stdin with the stored rules.")]
    Filter(FilterCommand),
}

/// Arguments for the `filter` command.
#[derive(Parser, Debug)]
pub struct FilterCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Caret position in UTF-16 code units (defaults to the end of the input).
    #[arg(long = "cursor", value_name = "N", help = "Caret position in UTF-16 code units (defaults to the end of the input).")]
    pub cursor: Option<usize>,

    /// Which element model to filter as.
    #[arg(long = "mode", value_name = "MODE", default_value = "plain", help = "Filter as a plain text field or as rich text.")]
    pub mode: FilterMode,

    /// Print the per-word substitution summary to stderr.
    #[arg(long = "summary", help = "Print the per-word substitution summary to stderr.")]
    pub summary: bool,
}

/// Element models the `filter` command can emulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterMode {
    /// An input or textarea: permissive right boundary, cursor tracked per match.
    Plain,
    /// A rich-text container: strict boundaries, cursor clamped.
    Rich,
}

impl From<FilterMode> for HeadlessEngineType {
    fn from(mode: FilterMode) -> Self {
        match mode {
            FilterMode::Plain => HeadlessEngineType::PlainText,
            FilterMode::Rich => HeadlessEngineType::RichText,
        }
    }
}

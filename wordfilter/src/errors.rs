// wordfilter/src/errors.rs
//! User-facing failures of the wordfilter CLI.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Please enter a word to filter")]
    EmptyWord,

    #[error("Word not found: '{0}'")]
    WordNotFound(String),

    #[error("No rule store location: pass --store or set WORDFILTER_STORE")]
    NoStorePath,

    #[error("Failed to read input file {0}")]
    InputUnreadable(PathBuf),
}

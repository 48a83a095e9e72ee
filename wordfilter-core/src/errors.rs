//! errors.rs - Custom error types for the wordfilter-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific error types that callers can match on programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// All error types surfaced by the `wordfilter-core` library.
///
/// Marked `#[non_exhaustive]` so new variants can be added without
/// breaking downstream `match` statements.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WordFilterError {
    #[error("Failed to compile pattern for trigger '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    /// Reading, locking or replacing the store file failed.
    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

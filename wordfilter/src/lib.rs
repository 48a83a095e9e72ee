// wordfilter/src/lib.rs
//! # wordfilter CLI
//!
//! Command-line rule manager and filter front end for `wordfilter-core`. The
//! binary edits the same JSON rule store the live text filter reads, and can
//! run either substitution engine over a file or stdin.
//!
//! License: MIT OR APACHE 2.0

pub mod cli;
pub mod commands;
pub mod errors;
pub mod logger;
pub mod ui;

pub use errors::CliError;

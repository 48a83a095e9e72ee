// wordfilter/src/logger.rs
//! Logger setup for the wordfilter binary.
//!
//! `RUST_LOG` is honoured unless a level override is passed, in which case the
//! override applies to both wordfilter crates. Logs go to stderr so that
//! filtered text on stdout stays clean.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes `env_logger`. Safe to call more than once; later calls are
/// ignored.
pub fn init_logger(level_override: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    builder.target(Target::Stderr).format_timestamp(None);

    if let Some(level) = level_override {
        builder
            .filter_module("wordfilter", level)
            .filter_module("wordfilter_core", level);
    }

    let _ = builder.try_init();
}

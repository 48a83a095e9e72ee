// wordfilter/src/main.rs
//! wordfilter entry point.
//!
//! Parses the command line, opens the rule store and dispatches to the
//! subcommand.

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use log::{debug, LevelFilter};
use std::io;
use std::path::PathBuf;

use wordfilter::cli::{Cli, Commands};
use wordfilter::commands::{self, filter, rules};
use wordfilter::logger;
use wordfilter::ui::theme::{build_theme_map, ThemeMap, ThemeStyle};
use wordfilter::CliError;
use wordfilter_core::{default_store_path, FileStore};

fn resolve_store_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.store {
        Some(path) => Ok(path.clone()),
        None => default_store_path().ok_or_else(|| CliError::NoStorePath.into()),
    }
}

fn run(cli: Cli, theme: &ThemeMap) -> Result<()> {
    let store_path = resolve_store_path(&cli)?;
    debug!("Using rule store at {}", store_path.display());
    let store = FileStore::open(&store_path)
        .with_context(|| format!("Failed to open rule store {}", store_path.display()))?;

    let opts = rules::RuleCommandOptions { theme, quiet: cli.quiet };
    match &cli.command {
        Commands::Add { word, replacement } => rules::run_add(&store, word, replacement.as_deref().unwrap_or(""), &opts),
        Commands::Remove { word } => rules::run_remove(&store, word, &opts),
        Commands::List { json } => {
            let stdout = io::stdout();
            let supports_color = stdout.is_terminal();
            rules::run_list(&store, *json, &mut stdout.lock(), supports_color)
        }
        Commands::Clear { yes } => rules::run_clear(&store, *yes, &opts),
        Commands::Filter(cmd) => filter::run_filter(&store, cmd, theme, cli.quiet),
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.quiet {
        logger::init_logger(Some(LevelFilter::Off));
    } else if cli.debug {
        logger::init_logger(Some(LevelFilter::Debug));
    } else {
        logger::init_logger(None);
    }

    let theme = match build_theme_map(cli.theme.as_deref()) {
        Ok(theme) => theme,
        Err(e) => {
            let fallback = ThemeStyle::default_theme_map();
            commands::error_msg(format!("{:#}", e), &fallback);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, &theme) {
        commands::error_msg(format!("{:#}", e), &theme);
        std::process::exit(1);
    }
}

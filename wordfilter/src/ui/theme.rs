//! Module for managing the CLI colour theme.
//!
//! A theme maps logical output elements to a 16-colour ANSI foreground. Users
//! can override any subset of entries with a JSON theme file; entries the file
//! leaves out keep their default colour.

use anyhow::{Context, Result};
use owo_colors::AnsiColors;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Type alias for the theme map.
pub type ThemeMap = HashMap<ThemeEntry, ThemeStyle>;

/// The logical parts of the output that can be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeEntry {
    /// Table headers and section titles.
    Header,
    /// Successful rule-manager operations.
    Success,
    Info,
    Warn,
    Error,
    /// Trigger words in listings and summaries.
    Trigger,
    /// Replacement text in listings and summaries.
    Replacement,
    /// Occurrence counts in the substitution summary.
    SummaryOccurrences,
    /// Confirmation questions.
    Prompt,
}

impl ThemeEntry {
    pub const ALL: [ThemeEntry; 9] = [
        ThemeEntry::Header,
        ThemeEntry::Success,
        ThemeEntry::Info,
        ThemeEntry::Warn,
        ThemeEntry::Error,
        ThemeEntry::Trigger,
        ThemeEntry::Replacement,
        ThemeEntry::SummaryOccurrences,
        ThemeEntry::Prompt,
    ];
}

/// A named ANSI colour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ThemeColor {
    Named(String),
}

#[derive(Debug, Clone)]
pub struct ParseThemeColorError;

impl fmt::Display for ParseThemeColorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid theme color; expected one of: black, red, green, yellow, blue, \
            magenta, cyan, white, brightblack, brightred, brightgreen, brightyellow, \
            brightblue, brightmagenta, brightcyan, brightwhite."
        )
    }
}

impl std::error::Error for ParseThemeColorError {}

impl FromStr for ThemeColor {
    type Err = ParseThemeColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "black" | "red" | "green" | "yellow" | "blue" | "magenta" | "cyan" | "white" |
            "brightblack" | "brightred" | "brightgreen" | "brightyellow" | "brightblue" |
            "brightmagenta" | "brightcyan" | "brightwhite" => Ok(ThemeColor::Named(lower)),
            _ => Err(ParseThemeColorError),
        }
    }
}

impl ThemeColor {
    fn named(name: &str) -> Self {
        ThemeColor::Named(name.to_string())
    }

    /// Converts to the matching `owo_colors::AnsiColors`. Unknown names fall
    /// back to white.
    pub fn to_ansi_color(&self) -> AnsiColors {
        match self {
            ThemeColor::Named(name) => match name.to_lowercase().as_str() {
                "black" => AnsiColors::Black,
                "red" => AnsiColors::Red,
                "green" => AnsiColors::Green,
                "yellow" => AnsiColors::Yellow,
                "blue" => AnsiColors::Blue,
                "magenta" => AnsiColors::Magenta,
                "cyan" => AnsiColors::Cyan,
                "white" => AnsiColors::White,
                "brightblack" => AnsiColors::BrightBlack,
                "brightred" => AnsiColors::BrightRed,
                "brightgreen" => AnsiColors::BrightGreen,
                "brightyellow" => AnsiColors::BrightYellow,
                "brightblue" => AnsiColors::BrightBlue,
                "brightmagenta" => AnsiColors::BrightMagenta,
                "brightcyan" => AnsiColors::BrightCyan,
                "brightwhite" => AnsiColors::BrightWhite,
                _ => AnsiColors::White,
            },
        }
    }
}

/// Style of a single `ThemeEntry`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemeStyle {
    pub fg: Option<ThemeColor>,
}

impl ThemeStyle {
    fn fg(name: &str) -> Self {
        ThemeStyle { fg: Some(ThemeColor::named(name)) }
    }

    /// Loads a JSON theme file and fills in every entry it leaves out from the
    /// default theme.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ThemeMap> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme file {}", path.display()))?;
        let mut custom: ThemeMap = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse theme file {}", path.display()))?;

        for (entry, style) in Self::default_theme_map() {
            custom.entry(entry).or_insert(style);
        }
        Ok(custom)
    }

    pub fn default_theme_map() -> ThemeMap {
        let mut default_theme = HashMap::new();
        default_theme.insert(ThemeEntry::Success, ThemeStyle::fg("green"));
        default_theme.insert(ThemeEntry::Warn, ThemeStyle::fg("yellow"));
        default_theme.insert(ThemeEntry::Error, ThemeStyle::fg("red"));
        default_theme.insert(ThemeEntry::Trigger, ThemeStyle::fg("brightred"));
        default_theme.insert(ThemeEntry::Replacement, ThemeStyle::fg("brightgreen"));
        default_theme.insert(ThemeEntry::SummaryOccurrences, ThemeStyle::fg("cyan"));
        default_theme.insert(ThemeEntry::Prompt, ThemeStyle::fg("brightyellow"));

        for entry in ThemeEntry::ALL {
            default_theme.entry(entry).or_insert_with(|| ThemeStyle::fg("white"));
        }
        default_theme
    }
}

/// Loads the theme at `theme_path`, or the default theme.
pub fn build_theme_map(theme_path: Option<&Path>) -> Result<ThemeMap> {
    match theme_path {
        Some(path) => ThemeStyle::load_from_file(path),
        None => Ok(ThemeStyle::default_theme_map()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_named_colors() {
        assert!("red".parse::<ThemeColor>().is_ok());
        assert!("BrightGreen".parse::<ThemeColor>().is_ok());
        assert!("unknown".parse::<ThemeColor>().is_err());
    }

    #[test]
    fn to_ansi_color_maps_names() {
        let tc: ThemeColor = "blue".parse().unwrap();
        assert_eq!(tc.to_ansi_color(), AnsiColors::Blue);
        let tc: ThemeColor = "brightmagenta".parse().unwrap();
        assert_eq!(tc.to_ansi_color(), AnsiColors::BrightMagenta);
    }

    #[test]
    fn default_theme_covers_every_entry() {
        let theme = ThemeStyle::default_theme_map();
        for entry in ThemeEntry::ALL {
            assert!(theme.get(&entry).and_then(|s| s.fg.as_ref()).is_some());
        }
    }

    #[test]
    fn partial_theme_file_is_merged_with_defaults() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, r#"{{ "success": {{ "fg": "magenta" }} }}"#)?;
        let theme = build_theme_map(Some(file.path()))?;
        assert_eq!(theme[&ThemeEntry::Success], ThemeStyle::fg("magenta"));
        assert_eq!(theme[&ThemeEntry::Error], ThemeStyle::fg("red"));
        Ok(())
    }
}

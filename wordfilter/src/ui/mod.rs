//! Terminal presentation: theme, message formatting, rule tables and
//! substitution summaries.

pub mod output_format;
pub mod rule_table;
pub mod substitution_summary;
pub mod theme;

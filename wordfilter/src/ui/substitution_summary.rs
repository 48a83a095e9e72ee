//! Prints the per-trigger substitution summary of a `filter` run.

use std::io::{self, Write};

use wordfilter_core::SubstitutionSummaryItem;

use super::output_format::styled;
use super::theme::{ThemeEntry, ThemeMap};

pub fn print_summary<W: Write>(
    summary: &[SubstitutionSummaryItem],
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    if summary.is_empty() {
        writeln!(writer, "{}", styled("No substitutions made.", ThemeEntry::Info, theme, supports_color))?;
        return Ok(());
    }

    writeln!(writer, "{}", styled("Substitution Summary:", ThemeEntry::Header, theme, supports_color))?;
    for item in summary {
        writeln!(
            writer,
            "  {} -> {} ({} occurrence{})",
            styled(&item.trigger, ThemeEntry::Trigger, theme, supports_color),
            styled(&item.replacement, ThemeEntry::Replacement, theme, supports_color),
            styled(&item.occurrences.to_string(), ThemeEntry::SummaryOccurrences, theme, supports_color),
            if item.occurrences == 1 { "" } else { "s" },
        )?;
    }
    Ok(())
}

//! Renders the stored rules as a table for `list`.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use wordfilter_core::RuleSet;

/// Builds a two-column Word / Replacement table in store order. Colour is
/// applied to the header only when `supports_color` is set.
pub fn build_rule_table(rules: &RuleSet, supports_color: bool) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header = ["Word", "Replacement"].map(|title| {
        let cell = Cell::new(title);
        if supports_color { cell.fg(Color::Cyan) } else { cell }
    });
    table.set_header(header);

    for rule in rules.iter() {
        table.add_row(vec![rule.trigger.as_str(), rule.replacement.as_str()]);
    }
    table
}

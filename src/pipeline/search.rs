//! Case-insensitive substring search across whole rows

use crate::table::Table;

/// Keep rows where any stringified cell contains the term
///
/// Matching is a case-insensitive literal substring check, no regex
/// semantics. A blank or whitespace-only term keeps every row. The scan
/// short-circuits on the first matching cell of each row.
pub fn filter_rows(mut table: Table, term: &str) -> Table {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return table;
    }

    table
        .rows
        .retain(|row| row.iter().any(|cell| cell.as_text().to_lowercase().contains(&needle)));
    table
}

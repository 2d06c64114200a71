//! Latest-row-per-key deduplication
//!
//! Collapses rows sharing a key column down to the single most recent row
//! according to a timestamp column. Rows whose timestamp fails to parse are
//! dropped outright, and the removed count reports everything that
//! disappeared, duplicates and unparseable rows alike.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::validate::ensure_timestamp_column;
use super::SortOrder;
use crate::error::{ViewerError, ViewerResult};
use crate::table::Table;
use crate::timestamp::parse_timestamp;

/// Keep the most recent row per key value
///
/// Ties on the timestamp keep the row that appeared first in the input.
/// The result is ordered by the timestamp column per `order`; the second
/// tuple element is the number of rows removed (input minus output).
pub fn dedupe_latest(
    table: &Table,
    key_column: &str,
    timestamp_column: &str,
    order: SortOrder,
) -> ViewerResult<(Table, usize)> {
    let key_index = table
        .column_index(key_column)
        .ok_or_else(|| ViewerError::ColumnNotFound(key_column.to_string()))?;
    let ts_index = ensure_timestamp_column(table, timestamp_column)?;

    // Key text -> (original row index, parsed timestamp) of the winner so far.
    // Strictly-later timestamps replace the winner; ties keep the earlier row.
    let mut winners: HashMap<String, (usize, NaiveDateTime)> = HashMap::new();
    for (row_index, row) in table.rows.iter().enumerate() {
        let ts = match parse_timestamp(&row[ts_index]) {
            Some(ts) => ts,
            None => continue,
        };
        let key = row[key_index].as_text();

        match winners.get(&key) {
            Some((_, best)) if ts <= *best => {}
            _ => {
                winners.insert(key, (row_index, ts));
            }
        }
    }

    let mut kept: Vec<(usize, NaiveDateTime)> = winners.into_values().collect();
    match order {
        SortOrder::Asc => kept.sort_by_key(|(row_index, ts)| (*ts, *row_index)),
        SortOrder::Desc => kept.sort_by_key(|(row_index, ts)| (Reverse(*ts), *row_index)),
    }

    let mut result = table.empty_like();
    for (row_index, _) in &kept {
        result.push_row(table.rows[*row_index].clone());
    }

    let removed = table.len() - result.len();
    Ok((result, removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn user_table(rows: Vec<(&str, &str)>) -> Table {
        Table::from_rows(
            vec!["UserId".to_string(), "Updated".to_string()],
            rows.into_iter()
                .map(|(user, ts)| vec![Cell::from(user), Cell::from(ts)])
                .collect(),
        )
    }

    #[test]
    fn test_keeps_most_recent_row_per_key() {
        let table = user_table(vec![
            ("A", "2024-01-01 10:00:00"),
            ("A", "2024-01-03 10:00:00"),
            ("B", "2024-01-02 10:00:00"),
        ]);

        let (result, removed) =
            dedupe_latest(&table, "UserId", "Updated", SortOrder::Desc).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(removed, 1);
        // Descending: A's latest row first, then B
        assert_eq!(result.rows[0][0], Cell::from("A"));
        assert_eq!(result.rows[0][1], Cell::from("2024-01-03 10:00:00"));
        assert_eq!(result.rows[1][0], Cell::from("B"));
    }

    #[test]
    fn test_timestamp_tie_keeps_first_row() {
        let table = Table::from_rows(
            vec!["UserId".to_string(), "Updated".to_string(), "Tag".to_string()],
            vec![
                vec![Cell::from("A"), Cell::from("2024-01-01 10:00:00"), Cell::from("first")],
                vec![Cell::from("A"), Cell::from("2024-01-01 10:00:00"), Cell::from("second")],
            ],
        );

        let (result, removed) =
            dedupe_latest(&table, "UserId", "Updated", SortOrder::Desc).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(removed, 1);
        assert_eq!(result.rows[0][2], Cell::from("first"));
    }

    #[test]
    fn test_removed_count_includes_unparseable_rows() {
        // Three distinct keys, but C's timestamp does not parse: C is dropped
        // and counted as removed even though it duplicated nothing.
        let table = user_table(vec![
            ("A", "2024-01-01 10:00:00"),
            ("A", "2024-01-02 10:00:00"),
            ("B", "2024-01-01 12:00:00"),
            ("C", "not-a-date"),
        ]);

        let (result, removed) =
            dedupe_latest(&table, "UserId", "Updated", SortOrder::Desc).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(removed, 2);
        assert!(!result
            .rows
            .iter()
            .any(|row| row[0] == Cell::from("C")));
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let table = user_table(vec![
            ("A", "2024-01-01 10:00:00"),
            ("A", "2024-01-03 10:00:00"),
            ("B", "2024-01-02 10:00:00"),
        ]);

        let (first, _) = dedupe_latest(&table, "UserId", "Updated", SortOrder::Desc).unwrap();
        let (second, removed) =
            dedupe_latest(&first, "UserId", "Updated", SortOrder::Desc).unwrap();

        assert_eq!(removed, 0);
        assert_eq!(second, first);
    }

    #[test]
    fn test_ascending_order() {
        let table = user_table(vec![
            ("B", "2024-01-05 10:00:00"),
            ("A", "2024-01-01 10:00:00"),
        ]);

        let (result, _) = dedupe_latest(&table, "UserId", "Updated", SortOrder::Asc).unwrap();

        assert_eq!(result.rows[0][0], Cell::from("A"));
        assert_eq!(result.rows[1][0], Cell::from("B"));
    }

    #[test]
    fn test_missing_key_column_fails() {
        let table = user_table(vec![("A", "2024-01-01")]);
        let err = dedupe_latest(&table, "Nope", "Updated", SortOrder::Desc).unwrap_err();
        assert!(matches!(err, ViewerError::ColumnNotFound(_)));
    }

    #[test]
    fn test_invalid_timestamp_column_fails() {
        let table = Table::from_rows(
            vec!["UserId".to_string(), "Notes".to_string()],
            vec![vec![Cell::from("A"), Cell::from("hello")]],
        );
        let err = dedupe_latest(&table, "UserId", "Notes", SortOrder::Desc).unwrap_err();
        assert!(matches!(err, ViewerError::InvalidColumn(_)));
    }
}

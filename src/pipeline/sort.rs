//! Timestamp ordering
//!
//! Orders rows by a validated timestamp column. Rows whose value fails to
//! parse are dropped, the same rule grouping and deduplication apply.

use std::cmp::Reverse;

use chrono::NaiveDateTime;

use super::validate::ensure_timestamp_column;
use super::SortOrder;
use crate::error::ViewerResult;
use crate::table::Table;
use crate::timestamp::parse_timestamp;

/// Order rows by a timestamp column, dropping unparseable rows
///
/// The sort is stable: rows with equal timestamps keep their original
/// relative order in both directions.
pub fn sort_by_timestamp(table: &Table, column: &str, order: SortOrder) -> ViewerResult<Table> {
    let ts_index = ensure_timestamp_column(table, column)?;

    let mut keyed: Vec<(usize, NaiveDateTime)> = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(row_index, row)| {
            parse_timestamp(&row[ts_index]).map(|ts| (row_index, ts))
        })
        .collect();

    match order {
        SortOrder::Asc => keyed.sort_by_key(|(_, ts)| *ts),
        SortOrder::Desc => keyed.sort_by_key(|(_, ts)| Reverse(*ts)),
    }

    let mut result = table.empty_like();
    for (row_index, _) in &keyed {
        result.push_row(table.rows[*row_index].clone());
    }
    Ok(result)
}

//! Time-period grouping
//!
//! Buckets rows by day or week using a validated timestamp column and
//! replaces the data with per-column non-null counts for each bucket.
//! Buckets are keyed and ordered by their start date, never by the
//! rendered label text.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use super::validate::ensure_timestamp_column;
use super::SortOrder;
use crate::error::{ViewerError, ViewerResult};
use crate::table::{Cell, Table};
use crate::timestamp::parse_timestamp;

/// Supported grouping periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
}

impl Period {
    /// Parse a request parameter; only the exact strings `day` and `week` qualify
    pub fn parse(value: &str) -> ViewerResult<Self> {
        match value {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            other => Err(ViewerError::InvalidPeriod(other.to_string())),
        }
    }

    /// Name of the label column added to grouped output
    pub fn label_column(&self) -> &'static str {
        match self {
            Period::Day => "Day_Group",
            Period::Week => "Week_Group",
        }
    }

    /// First day of the bucket containing `ts` (weeks start on Monday)
    fn bucket_start(&self, ts: NaiveDateTime) -> NaiveDate {
        let date = ts.date();
        match self {
            Period::Day => date,
            Period::Week => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
        }
    }

    fn bucket_label(&self, start: NaiveDate) -> String {
        match self {
            Period::Day => start.format("%Y-%m-%d").to_string(),
            Period::Week => format!("Week of {}", start.format("%Y-%m-%d")),
        }
    }
}

/// Group rows into time buckets with per-column non-null counts
///
/// Rows whose timestamp fails to parse are excluded (and logged); if every
/// row is excluded the grouping fails with `NoValidTimestamps`. The output
/// table has the bucket label as its first column followed by the original
/// columns, one row per bucket, ordered by bucket start.
pub fn group_by_period(
    table: &Table,
    column: &str,
    period: Period,
    order: SortOrder,
) -> ViewerResult<Table> {
    let ts_index = ensure_timestamp_column(table, column)?;

    // Bucket start -> per-column non-null counts, ascending by start date
    let mut buckets: BTreeMap<NaiveDate, Vec<i64>> = BTreeMap::new();
    let mut parsed_rows = 0usize;

    for row in &table.rows {
        let ts = match parse_timestamp(&row[ts_index]) {
            Some(ts) => ts,
            None => continue,
        };
        parsed_rows += 1;

        let counts = buckets
            .entry(period.bucket_start(ts))
            .or_insert_with(|| vec![0; table.columns.len()]);
        for (index, cell) in row.iter().enumerate() {
            if !cell.is_null() {
                counts[index] += 1;
            }
        }
    }

    if parsed_rows == 0 {
        return Err(ViewerError::NoValidTimestamps(column.to_string()));
    }

    let dropped = table.len() - parsed_rows;
    if dropped > 0 {
        tracing::warn!(
            column,
            dropped,
            "rows filtered out due to invalid timestamps"
        );
    }

    let mut columns = Vec::with_capacity(table.columns.len() + 1);
    columns.push(period.label_column().to_string());
    columns.extend(table.columns.iter().cloned());

    let mut grouped = Table::new(columns);
    let entries: Vec<(NaiveDate, Vec<i64>)> = match order {
        SortOrder::Asc => buckets.into_iter().collect(),
        SortOrder::Desc => buckets.into_iter().rev().collect(),
    };
    for (start, counts) in entries {
        let mut row = Vec::with_capacity(counts.len() + 1);
        row.push(Cell::Text(period.bucket_label(start)));
        row.extend(counts.into_iter().map(Cell::Int));
        grouped.push_row(row);
    }

    Ok(grouped)
}

//! Timestamp column validation and introspection
//!
//! Validation samples the first values of a column and gates on the fraction
//! that parse as timestamps. The result is a verdict plus a human-readable
//! message; it never fails outright, even for unknown columns.

use crate::error::{ViewerError, ViewerResult};
use crate::table::{Cell, Table};
use crate::timestamp::parse_timestamp;

/// Maximum number of non-null values sampled during validation
const VALIDATION_SAMPLE_SIZE: usize = 50;

/// Minimum fraction of sampled values that must parse as timestamps
const VALID_RATIO_THRESHOLD: f64 = 0.7;

/// Number of leading non-null values probed when detecting timestamp columns
const DETECTION_SAMPLE_SIZE: usize = 5;

/// Verdict of validating a column as a timestamp source
#[derive(Debug, Clone)]
pub struct ColumnValidation {
    pub valid: bool,
    pub message: String,
}

impl ColumnValidation {
    fn invalid(message: String) -> Self {
        Self {
            valid: false,
            message,
        }
    }

    fn valid(message: String) -> Self {
        Self {
            valid: true,
            message,
        }
    }
}

/// Validate that a column contains enough parseable timestamp data
///
/// Samples up to the first 50 non-null values in row order and requires at
/// least 70% of them to parse. The boundary is inclusive: exactly 70% passes.
pub fn validate_timestamp_column(table: &Table, column: &str) -> ColumnValidation {
    let index = match table.column_index(column) {
        Some(index) => index,
        None => {
            return ColumnValidation::invalid(format!(
                "Column '{}' not found in the data",
                column
            ))
        }
    };

    let sample: Vec<&Cell> = table
        .column_values(index)
        .filter(|cell| !cell.is_null())
        .take(VALIDATION_SAMPLE_SIZE)
        .collect();

    if sample.is_empty() {
        return ColumnValidation::invalid(format!("Column '{}' contains no data", column));
    }

    let parsed = sample
        .iter()
        .filter(|cell| parse_timestamp(cell).is_some())
        .count();
    let ratio = parsed as f64 / sample.len() as f64;

    if ratio < VALID_RATIO_THRESHOLD {
        return ColumnValidation::invalid(format!(
            "Column '{}' contains insufficient valid timestamp data ({:.1}% valid). \
             Expected formats: YYYY-MM-DD, YYYY-MM-DD HH:MM:SS, ISO 8601, etc.",
            column,
            ratio * 100.0
        ));
    }

    ColumnValidation::valid(format!(
        "Column '{}' validated successfully ({:.1}% valid timestamps)",
        column,
        ratio * 100.0
    ))
}

/// Resolve a column for timestamp-based stages
///
/// Returns the column index, or the stage errors shared by grouping,
/// deduplication and sorting: `ColumnNotFound` for unknown columns,
/// `InvalidColumn` carrying the validator message otherwise.
pub fn ensure_timestamp_column(table: &Table, column: &str) -> ViewerResult<usize> {
    let index = table
        .column_index(column)
        .ok_or_else(|| ViewerError::ColumnNotFound(column.to_string()))?;

    let validation = validate_timestamp_column(table, column);
    if !validation.valid {
        return Err(ViewerError::InvalidColumn(validation.message));
    }

    Ok(index)
}

/// Columns whose leading values look like timestamps
///
/// A column qualifies when any of its first 5 non-null values parses.
pub fn detect_timestamp_columns(table: &Table) -> Vec<String> {
    table
        .columns
        .iter()
        .enumerate()
        .filter(|(index, _)| {
            table
                .column_values(*index)
                .filter(|cell| !cell.is_null())
                .take(DETECTION_SAMPLE_SIZE)
                .any(|cell| parse_timestamp(cell).is_some())
        })
        .map(|(_, name)| name.clone())
        .collect()
}

//! Table transformation pipeline
//!
//! Applies a query to a fetched table through a fixed stage order:
//! deduplication, grouping, sorting, search, pagination. Deduplication and
//! grouping each run only when their parameters are present; a stage that
//! fails records its error message (first error wins) and leaves the table
//! as the previous stage produced it, so the pipeline always yields a
//! usable result. Search and pagination always run.
//!
//! # Example
//! ```
//! use tavola::pipeline::{apply_query, TableQuery};
//! use tavola::table::{Cell, Table};
//!
//! let table = Table::from_rows(
//!     vec!["Name".to_string(), "Joined".to_string()],
//!     vec![
//!         vec![Cell::from("Alice"), Cell::from("2024-01-02")],
//!         vec![Cell::from("Bob"), Cell::from("2024-01-01")],
//!     ],
//! );
//!
//! let query = TableQuery {
//!     search: Some("alice".to_string()),
//!     ..TableQuery::default()
//! };
//! let view = apply_query(table, &query);
//! assert_eq!(view.total, 1);
//! assert!(view.error.is_none());
//! ```

pub mod dedupe;
pub mod group;
pub mod page;
pub mod search;
pub mod sort;
pub mod validate;

pub use group::Period;
pub use page::PageMeta;
pub use validate::{detect_timestamp_columns, validate_timestamp_column, ColumnValidation};

use crate::table::Table;

/// Page size used when a query does not specify one
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Row ordering direction shared by grouping, deduplication and sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse a request parameter, falling back to the default (descending)
    /// for anything unrecognized
    pub fn parse_param(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => SortOrder::default(),
        }
    }
}

/// Everything a caller can ask of the pipeline
///
/// All transformation parameters are optional; blank strings count as
/// absent. Malformed values never abort the pipeline: they surface as the
/// error message on the resulting [`TableView`].
#[derive(Debug, Clone)]
pub struct TableQuery {
    /// Case-insensitive substring to filter rows by
    pub search: Option<String>,
    /// Grouping period, `day` or `week`
    pub group_by_period: Option<String>,
    /// Timestamp column used for grouping
    pub timestamp_column: Option<String>,
    /// Key column for deduplication
    pub dedupe_column: Option<String>,
    /// Timestamp column deciding which duplicate is most recent
    pub dedupe_timestamp_column: Option<String>,
    /// Timestamp column to sort by when no grouping or dedup applies
    pub sort_column: Option<String>,
    pub sort_order: SortOrder,
    /// 1-based page number
    pub page: i64,
    pub page_size: usize,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            search: None,
            group_by_period: None,
            timestamp_column: None,
            dedupe_column: None,
            dedupe_timestamp_column: None,
            sort_column: None,
            sort_order: SortOrder::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Outcome of running a query through the pipeline
///
/// The flags report what actually took effect, not what was requested:
/// a grouping that failed and was rolled back leaves `grouped` false and
/// puts its message in `error`.
#[derive(Debug, Clone)]
pub struct TableView {
    /// The transformed page of rows
    pub table: Table,
    pub grouped: bool,
    pub deduplicated: bool,
    /// Rows removed by deduplication, unparseable-timestamp drops included
    pub duplicates_removed: usize,
    /// Row count of the fetched table before any stage ran
    pub original_count: usize,
    /// First stage error encountered, if any
    pub error: Option<String>,
    /// Row count after transforms, before pagination
    pub total: usize,
    pub page: i64,
    pub page_size: usize,
    pub pages: usize,
    /// Trimmed search term, when one applied
    pub search_term: Option<String>,
}

/// Treat a parameter as present only when it has non-whitespace content
///
/// The original value is passed through untrimmed; column names keep any
/// surrounding spaces they were sent with.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Run a query through the full pipeline
///
/// Never returns an error: stage failures are contained, recorded on the
/// view, and roll back to the table the previous stage produced.
pub fn apply_query(table: Table, query: &TableQuery) -> TableView {
    let original_count = table.len();
    let mut table = table;
    let mut error: Option<String> = None;
    let mut grouped = false;
    let mut deduplicated = false;
    let mut duplicates_removed = 0usize;

    tracing::debug!(
        rows = original_count,
        search = query.search.as_deref().unwrap_or(""),
        "applying table query"
    );

    // Deduplication runs first so grouping sees collapsed rows
    if let (Some(key), Some(ts)) = (
        non_blank(&query.dedupe_column),
        non_blank(&query.dedupe_timestamp_column),
    ) {
        match dedupe::dedupe_latest(&table, key, ts, query.sort_order) {
            Ok((result, removed)) => {
                table = result;
                deduplicated = true;
                duplicates_removed = removed;
            }
            Err(e) => {
                error.get_or_insert(e.to_string());
            }
        }
    }

    // Grouping; the period string is checked before any transform work
    if let (Some(period_param), Some(ts)) = (
        non_blank(&query.group_by_period),
        non_blank(&query.timestamp_column),
    ) {
        match Period::parse(period_param) {
            Ok(period) => match group::group_by_period(&table, ts, period, query.sort_order) {
                Ok(result) => {
                    table = result;
                    grouped = true;
                }
                Err(e) => {
                    error.get_or_insert(e.to_string());
                }
            },
            Err(e) => {
                error.get_or_insert(e.to_string());
            }
        }
    }

    // Sorting applies only when no stage has already imposed an order
    if !grouped && !deduplicated {
        if let Some(column) = non_blank(&query.sort_column) {
            match sort::sort_by_timestamp(&table, column, query.sort_order) {
                Ok(result) => table = result,
                Err(e) => {
                    error.get_or_insert(e.to_string());
                }
            }
        }
    }

    // Search and pagination always run, whatever survived above
    let search_term = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);
    if let Some(term) = &search_term {
        table = search::filter_rows(table, term);
    }

    let (page_table, meta) = page::paginate(table, query.page, query.page_size);

    TableView {
        table: page_table,
        grouped,
        deduplicated,
        duplicates_removed,
        original_count,
        error,
        total: meta.total,
        page: meta.page,
        page_size: meta.page_size,
        pages: meta.pages,
        search_term,
    }
}

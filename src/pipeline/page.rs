//! Pagination over the final row sequence

use crate::table::Table;

/// Pagination metadata computed alongside the page slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    /// Row count before slicing
    pub total: usize,
    /// Requested page number, echoed back as-is
    pub page: i64,
    pub page_size: usize,
    /// ceil(total / page_size), or 1 when page_size is 0
    pub pages: usize,
}

/// Slice out one page of rows
///
/// Pages are 1-based. Page numbers at or below zero clamp to the first
/// page; pages past the end yield an empty table, never an error.
pub fn paginate(mut table: Table, page: i64, page_size: usize) -> (Table, PageMeta) {
    let total = table.len();

    let start = page.saturating_sub(1).max(0) as usize;
    let start = start.saturating_mul(page_size).min(total);
    let remaining = total - start;

    if start > 0 {
        table.rows.drain(..start);
    }
    table.rows.truncate(page_size.min(remaining));

    let pages = if page_size == 0 {
        1
    } else {
        total.div_ceil(page_size)
    };

    (
        table,
        PageMeta {
            total,
            page,
            page_size,
            pages,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn numbered_table(count: usize) -> Table {
        Table::from_rows(
            vec!["Id".to_string()],
            (0..count).map(|i| vec![Cell::Int(i as i64)]).collect(),
        )
    }

    #[test]
    fn test_pagination_arithmetic() {
        // 25 rows at size 10: pages of 10, 10 and 5
        let (page1, meta) = paginate(numbered_table(25), 1, 10);
        assert_eq!(meta.total, 25);
        assert_eq!(meta.pages, 3);
        assert_eq!(page1.len(), 10);
        assert_eq!(page1.rows[0][0], Cell::Int(0));

        let (page3, _) = paginate(numbered_table(25), 3, 10);
        assert_eq!(page3.len(), 5);
        assert_eq!(page3.rows[0][0], Cell::Int(20));
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let (page4, meta) = paginate(numbered_table(25), 4, 10);
        assert_eq!(page4.len(), 0);
        assert_eq!(meta.total, 25);
        assert_eq!(meta.pages, 3);
    }

    #[test]
    fn test_page_zero_and_negative_clamp_to_start() {
        let (rows, meta) = paginate(numbered_table(5), 0, 2);
        assert_eq!(rows.rows[0][0], Cell::Int(0));
        assert_eq!(meta.page, 0);

        let (rows, _) = paginate(numbered_table(5), -3, 2);
        assert_eq!(rows.rows[0][0], Cell::Int(0));
    }

    #[test]
    fn test_zero_page_size_degenerate_guard() {
        let (rows, meta) = paginate(numbered_table(5), 1, 0);
        assert_eq!(rows.len(), 0);
        assert_eq!(meta.total, 5);
        assert_eq!(meta.pages, 1);
    }

    #[test]
    fn test_empty_table_has_zero_pages() {
        let (rows, meta) = paginate(numbered_table(0), 1, 10);
        assert_eq!(rows.len(), 0);
        assert_eq!(meta.pages, 0);
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        let (rows, meta) = paginate(numbered_table(3), i64::MAX, usize::MAX);
        assert_eq!(rows.len(), 0);
        assert!(meta.pages >= 1);
    }
}

//! # Pagination
//!
//! Cursor-free offset pagination, shared by thread listing and comment
//! listing. A page is valid when `size > 0` and `0 <= index < max_pages`,
//! with one deliberate boundary case: page 0 of an empty result set is a
//! valid, empty page rather than a range error.
//!
//! The count and the paginated read issued by one store operation run on
//! the same session and therefore see one snapshot. Across separate
//! operations (a listing followed by a `*_max_pages` call) both report
//! against the best-effort current row count, not a frozen snapshot.

use ib_core::{AppError, Result};

/// A validated page request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Page {
    pub(crate) index: i64,
    pub(crate) size: i64,
}

impl Page {
    pub(crate) fn new(index: i64, size: i64) -> Result<Self> {
        ensure_positive_size(size)?;
        if index < 0 {
            return Err(AppError::Validation(format!(
                "page must be non-negative, got {index}"
            )));
        }
        Ok(Page { index, size })
    }

    pub(crate) fn limit(&self) -> i64 {
        self.size
    }

    pub(crate) fn offset(&self) -> i64 {
        self.index * self.size
    }
}

pub(crate) fn ensure_positive_size(size: i64) -> Result<()> {
    if size <= 0 {
        return Err(AppError::Validation(format!(
            "size must be positive, got {size}"
        )));
    }
    Ok(())
}

/// `ceil(total / size)` in integer math. A missing count (the COUNT query
/// produced no row, which SQL cannot actually do) maps to the sentinel -1.
pub(crate) fn max_pages(total: Option<i64>, size: i64) -> i64 {
    match total {
        // Divide before rounding: `size` is caller-supplied and may be
        // i64::MAX, so `n + size - 1` is not safe to compute.
        Some(n) => n / size + i64::from(n % size != 0),
        None => -1,
    }
}

/// Range check performed after counting, before reading the page.
pub(crate) fn check_range(page: &Page, max_pages: i64) -> Result<()> {
    if page.index == 0 && max_pages == 0 {
        // An empty result set still has a readable (empty) first page.
        return Ok(());
    }
    if page.index >= max_pages {
        return Err(AppError::Validation(format!(
            "page {} out of range, valid pages are 0..{max_pages}",
            page.index
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_pages_rounds_up() {
        assert_eq!(max_pages(Some(0), 10), 0);
        assert_eq!(max_pages(Some(1), 10), 1);
        assert_eq!(max_pages(Some(10), 10), 1);
        assert_eq!(max_pages(Some(11), 10), 2);
        assert_eq!(max_pages(Some(3), 2), 2);
    }

    #[test]
    fn test_max_pages_survives_huge_sizes() {
        assert_eq!(max_pages(Some(0), i64::MAX), 0);
        assert_eq!(max_pages(Some(1), i64::MAX), 1);
        assert_eq!(max_pages(Some(i64::MAX), i64::MAX), 1);
        assert_eq!(max_pages(Some(i64::MAX), 1), i64::MAX);
    }

    #[test]
    fn test_max_pages_sentinel_on_missing_count() {
        assert_eq!(max_pages(None, 10), -1);
    }

    #[test]
    fn test_page_rejects_bad_arguments() {
        assert!(Page::new(0, 0).is_err());
        assert!(Page::new(0, -5).is_err());
        assert!(Page::new(-1, 10).is_err());
        assert!(Page::new(0, 1).is_ok());
    }

    #[test]
    fn test_offset_is_index_times_size() {
        let page = Page::new(3, 25).unwrap();
        assert_eq!(page.offset(), 75);
        assert_eq!(page.limit(), 25);
    }

    #[test]
    fn test_empty_set_allows_page_zero_only() {
        let first = Page::new(0, 10).unwrap();
        assert!(check_range(&first, 0).is_ok());

        let second = Page::new(1, 10).unwrap();
        let err = check_range(&second, 0).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_range_error_names_the_bound() {
        let page = Page::new(2, 2).unwrap();
        let err = check_range(&page, 2).unwrap_err();
        assert!(err.to_string().contains("0..2"));
    }
}

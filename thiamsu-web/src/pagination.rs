//! Page arithmetic for song and translation listings

use serde::Serialize;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Total number of pages
    pub total_pages: i64,
    pub page_size: i64,
    /// Offset for SQL LIMIT/OFFSET query
    #[serde(skip)]
    pub offset: i64,
}

/// Calculate pagination metadata from total results and requested page
///
/// The page is clamped to `[1, total_pages]`, so a page number past the end
/// shows the last page and anything below 1 shows the first.
///
/// # Examples
/// ```
/// use thiamsu_web::pagination::calculate_pagination;
///
/// // 45 songs at 20 per page = 3 pages (20 + 20 + 5)
/// let p = calculate_pagination(45, 2, 20);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 20);
///
/// let p = calculate_pagination(45, 99, 20);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 40);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64, page_size: i64) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = (total_results + page_size - 1) / page_size;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        total_pages,
        page_size,
        offset,
    }
}

/// Page number from a query string value; anything unparsable is page 1
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|p| p.trim().parse().ok()).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(45, 2, 20);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 20);
    }

    #[test]
    fn test_pagination_out_of_bounds_high() {
        let p = calculate_pagination(30, 99, 20);
        assert_eq!(p.page, 2);
        assert_eq!(p.offset, 20);
    }

    #[test]
    fn test_pagination_out_of_bounds_low() {
        let p = calculate_pagination(30, -3, 20);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, 1, 20);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_exact_page_boundary() {
        let p = calculate_pagination(40, 2, 20);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 20);
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(Some("3")), 3);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("")), 1);
        assert_eq!(parse_page(None), 1);
    }
}

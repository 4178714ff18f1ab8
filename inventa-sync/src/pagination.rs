//! Pagination utilities for the inventory query API

/// Default rows per page when the request does not specify a limit
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Hard cap on rows per page
pub const MAX_PAGE_SIZE: i64 = 500;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page after clamping
    pub limit: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Calculate pagination metadata from total results and the requested
/// page/limit, clamping both into valid bounds
pub fn calculate_pagination(total_results: i64, requested_page: i64, requested_limit: i64) -> Pagination {
    let limit = requested_limit.max(1).min(MAX_PAGE_SIZE);
    let total_pages = (total_results + limit - 1) / limit;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * limit;

    Pagination {
        page,
        limit,
        total_pages,
        offset,
    }
}

//! Pagination utilities for list endpoints
//!
//! Paging is opt-in: endpoints return everything unless the client sends
//! `page` or `limit`.

use piket_common::Error;
use serde::Serialize;

/// Page size used when only `page` is given
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page a client may request
pub const MAX_LIMIT: i64 = 500;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page
    pub limit: i64,
    /// Total number of rows across all pages
    pub total: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Index of the first row on this page
    #[serde(skip)]
    pub offset: i64,
}

/// Calculate pagination metadata from total results and requested page
///
/// The page is clamped to `[1, total_pages]` and the limit to `[1, MAX_LIMIT]`.
///
/// # Examples
/// ```
/// use piket_server::pagination::calculate_pagination;
///
/// // 250 rows at 100 per page = 3 pages (100 + 100 + 50)
/// let p = calculate_pagination(250, 2, 100);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 100);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(250, 99, 100);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 200);
/// ```
pub fn calculate_pagination(total: i64, requested_page: i64, limit: i64) -> Pagination {
    let limit = limit.clamp(1, MAX_LIMIT);
    let total_pages = (total + limit - 1) / limit;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * limit;

    Pagination {
        page,
        limit,
        total,
        total_pages,
        offset,
    }
}

/// Parse optional `page` / `limit` query values
///
/// Returns `None` when neither is present.
pub fn parse_page_params(page: Option<&str>, limit: Option<&str>) -> Result<Option<(i64, i64)>, Error> {
    if page.is_none() && limit.is_none() {
        return Ok(None);
    }

    let parse = |raw: Option<&str>, name: &str, default: i64| -> Result<i64, Error> {
        match raw {
            None => Ok(default),
            Some(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| Error::Validation(format!("{} must be a positive integer", name))),
        }
    };

    Ok(Some((parse(page, "page", 1)?, parse(limit, "limit", DEFAULT_LIMIT)?)))
}

/// Slice of `items` covered by `pagination`
pub fn page_of<T>(items: Vec<T>, pagination: &Pagination) -> Vec<T> {
    items
        .into_iter()
        .skip(pagination.offset as usize)
        .take(pagination.limit as usize)
        .collect()
}

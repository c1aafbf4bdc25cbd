//! Shared pagination types for API query parameters.
//!
//! Record listings (`/api/incidents`, `/api/evacuation-centers`, ...) use offset-based
//! pagination with `skip` and `limit`. The activity feed keeps its page-number contract
//! through [`PageQuery`].

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Default number of items to return per page.
pub const DEFAULT_LIMIT: i64 = 10;

/// Maximum number of items that can be requested per page.
pub const MAX_LIMIT: i64 = 100;

/// Offset pagination: `skip` (default 0) and `limit` (default 10, clamped to 1..=100).
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct Pagination {
    /// Number of items to skip (default: 0)
    #[param(default = 0, minimum = 0)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub skip: Option<i64>,

    /// Maximum number of items to return (default: 10, max: 100)
    #[param(default = 10, minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
}

impl Pagination {
    #[inline]
    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    #[inline]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// Page-number pagination: `page` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: i64,
    pub limit: i64,
}

impl PageQuery {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    /// Rows skipped before this page. Saturates at `i64::MAX` for absurd page numbers,
    /// which Postgres accepts as an `OFFSET` and answers with an empty page.
    #[inline]
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Whether rows exist past this page, given the total match count.
    #[inline]
    pub fn has_more(&self, total: i64) -> bool {
        self.offset().saturating_add(self.limit) < total
    }
}

/// Generic paginated response wrapper for list endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedResponse<T: ToSchema> {
    /// The items for the current page
    pub data: Vec<T>,
    /// Total number of items matching the query (before pagination)
    pub total_count: i64,
    pub skip: i64,
    pub limit: i64,
}

impl<T: ToSchema> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total_count: i64, skip: i64, limit: i64) -> Self {
        Self {
            data,
            total_count,
            skip,
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination {
            skip: Some(-5),
            limit: Some(1000),
        };
        assert_eq!(p.skip(), 0);
        assert_eq!(p.limit(), MAX_LIMIT);

        let p = Pagination::default();
        assert_eq!(p.skip(), 0);
        assert_eq!(p.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_pagination_from_query_string() {
        let uri: axum::http::Uri = "/?skip=20&limit=5".parse().unwrap();
        let p = axum::extract::Query::<Pagination>::try_from_uri(&uri).unwrap().0;
        assert_eq!(p.skip(), 20);
        assert_eq!(p.limit(), 5);
    }

    #[test]
    fn test_page_query() {
        let q = PageQuery::new(None, None);
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
        assert_eq!(q.offset(), 0);
        assert!(q.has_more(11));
        assert!(!q.has_more(10));

        let q = PageQuery::new(Some(3), Some(25));
        assert_eq!(q.offset(), 50);
        assert!(!q.has_more(75));
        assert!(q.has_more(76));

        let q = PageQuery::new(Some(0), Some(0));
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 1);
    }

    #[test]
    fn test_page_query_huge_page_saturates() {
        let q = PageQuery::new(Some(i64::MAX), Some(100));
        assert_eq!(q.offset(), i64::MAX);
        assert!(!q.has_more(i64::MAX));
        assert!(!q.has_more(10));

        let q = PageQuery::new(Some(i64::MAX / 10 + 2), Some(10));
        assert_eq!(q.offset(), i64::MAX);

        let q = PageQuery::new(Some(i64::MIN), None);
        assert_eq!(q.page, 1);
        assert_eq!(q.offset(), 0);
    }
}

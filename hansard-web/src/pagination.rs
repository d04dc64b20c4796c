//! Pagination utilities
//!
//! Page parameters are clamped, never rejected: page numbers below 1 become 1
//! and page sizes are forced into the endpoint's bounds.

use serde::Serialize;

use crate::params::ParamMap;

/// Allowed page sizes for one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub default_size: u32,
    pub min_size: u32,
    pub max_size: u32,
}

impl PageBounds {
    pub const fn new(default_size: u32, min_size: u32, max_size: u32) -> Self {
        Self {
            default_size,
            min_size,
            max_size,
        }
    }
}

pub const SPEECH_PAGE_BOUNDS: PageBounds = PageBounds::new(10, 1, 100);
pub const MEMBER_PAGE_BOUNDS: PageBounds = PageBounds::new(20, 1, 100);
pub const BILL_PAGE_BOUNDS: PageBounds = PageBounds::new(20, 1, 100);

/// A clamped page request (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: i64, size: i64, bounds: PageBounds) -> Self {
        let page = page.clamp(1, i64::from(u32::MAX)) as u32;
        let size = size.clamp(i64::from(bounds.min_size), i64::from(bounds.max_size)) as u32;
        Self { page, size }
    }

    /// Read `page` and `pageSize` (or `page_size`) from the query string
    pub fn from_params(params: &ParamMap, bounds: PageBounds) -> Self {
        let page = params.int(&["page"]).unwrap_or(1);
        let size = params
            .int(&["pageSize", "page_size"])
            .unwrap_or(i64::from(bounds.default_size));
        Self::new(page, size, bounds)
    }

    /// Row offset for `LIMIT/OFFSET`
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// Whether rows remain after this page
    pub fn has_next(&self, total: u64) -> bool {
        u64::from(self.page) * u64::from(self.size) < total
    }
}

/// One page of rows plus the total row count under the same filters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(rows: Vec<T>, total: u64) -> Self {
        Self { rows, total }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Page whose total is simply its row count (unpaginated queries)
    pub fn complete(rows: Vec<T>) -> Self {
        let total = rows.len() as u64;
        Self::new(rows, total)
    }
}

/// Response body for paginated endpoints
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub rows: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_next: bool,
}

impl<T> PageResponse<T> {
    pub fn new(page: Page<T>, request: PageRequest) -> Self {
        Self {
            has_next: request.has_next(page.total),
            rows: page.rows,
            total: page.total,
            page: request.page,
            page_size: request.size,
        }
    }
}

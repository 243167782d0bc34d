//! Pagination parameters, metadata and the page-count helper.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Number of pages needed for `total_items` at `per_page` items per page.
///
/// Ceiling division; a `per_page` of zero yields zero pages.
pub fn total_pages(total_items: u64, per_page: u32) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total_items.div_ceil(u64::from(per_page))
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Parameters for a paginated listing.
///
/// `filter` and `sort_by` are interpreted by the repository; the services
/// only forward them.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListParams<F> {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: u32,

    /// Number of items per page
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 100, message = "Per page must be between 1 and 100"))]
    pub per_page: u32,

    #[serde(default)]
    pub filter: F,

    #[serde(default)]
    pub sort_by: Option<String>,

    #[serde(default)]
    pub sort_order: SortOrder,
}

impl<F: Default> ListParams<F> {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            filter: F::default(),
            sort_by: None,
            sort_order: SortOrder::default(),
        }
    }
}

impl<F> ListParams<F> {
    pub fn with_filter(mut self, filter: F) -> Self {
        self.filter = filter;
        self
    }

    pub fn sorted_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(column.into());
        self.sort_order = order;
        self
    }

    /// Clamps out-of-range values to the defaults.
    pub fn normalize(mut self) -> Self {
        if self.page == 0 {
            self.page = DEFAULT_PAGE;
        }
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            self.per_page = DEFAULT_PER_PAGE;
        }
        self
    }

    /// Number of records to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl<F: Default> Default for ListParams<F> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PER_PAGE)
    }
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(current_page: u32, per_page: u32, total_items: u64) -> Self {
        Self {
            current_page,
            per_page,
            total_items,
            total_pages: total_pages(total_items, per_page),
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.current_page) < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

/// One page of records plus its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> PaginatedResult<T> {
    pub fn new<F>(data: Vec<T>, params: &ListParams<F>, total_items: u64) -> Self {
        Self {
            data,
            meta: PaginationMeta::new(params.page, params.per_page, total_items),
        }
    }
}

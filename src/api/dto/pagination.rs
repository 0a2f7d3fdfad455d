//! Pagination-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::repositories::Page;

/// Query parameters for pagination.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams, Validate)]
pub struct PaginationParams {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    #[param(minimum = 1, example = 1)]
    pub page: u32,

    /// Number of items per page (max 100)
    #[serde(default = "default_size")]
    #[validate(range(min = 1, max = 100, message = "Size must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 20)]
    pub size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

impl PaginationParams {
    /// Calculates the offset for database queries.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.size)
    }

    /// Returns the limit for database queries.
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    20
}

/// Generic paged response wrapper.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages
    #[schema(example = 42)]
    pub total: i64,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub size: u32,
    /// Total number of pages
    #[schema(example = 3)]
    pub pages: u32,
}

impl<T> Paginated<T> {
    /// Maps a repository page into the response shape.
    pub fn from_page<M>(page: Page<M>, params: &PaginationParams) -> Self
    where
        T: From<M>,
    {
        let total = page.total.max(0);
        let pages = (total as u64).div_ceil(u64::from(params.size.max(1))) as u32;
        Self {
            items: page.items.into_iter().map(T::from).collect(),
            total,
            page: params.page,
            size: params.size,
            pages,
        }
    }
}

//! Query Normalization
//!
//! Turns the raw, stringly-typed parameters from the transport layer into
//! bounded values. Nothing in here fails: bad input falls back to a default.

use super::types::ContentType;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 50;

pub const DEFAULT_TRENDING_LIMIT: usize = 10;
pub const MAX_TRENDING_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Pagination {
    /// `page` is always >= 1 and `page_size` always within `[1, max_page_size]`.
    pub fn from_raw(page: Option<&str>, page_size: Option<&str>, limits: &PageLimits) -> Self {
        let page = parse_positive(page).unwrap_or(DEFAULT_PAGE);
        let page_size = parse_positive(page_size)
            .unwrap_or(limits.default_page_size)
            .min(limits.max_page_size);

        Self { page, page_size }
    }

    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Empty means "no filter"; anything else passes through verbatim.
pub fn normalize_content_type(raw: Option<&str>) -> Option<ContentType> {
    match raw {
        Some(value) if !value.trim().is_empty() => Some(ContentType::from(value)),
        _ => None,
    }
}

pub fn normalize_limit(raw: Option<&str>) -> usize {
    parse_positive(raw)
        .unwrap_or(DEFAULT_TRENDING_LIMIT)
        .min(MAX_TRENDING_LIMIT)
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    let value: i64 = raw?.trim().parse().ok()?;
    if value < 1 {
        return None;
    }
    usize::try_from(value).ok()
}

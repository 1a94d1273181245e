pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod error;

pub use types::*;
pub use filter::CourseFilter;
pub use error::FilterError;

use crate::types::PageRequest;

/// Validate a zero-based page index against a fixed page size
pub fn page_request(page: Option<i64>, size: i64) -> Result<PageRequest, FilterError> {
    let page = page.unwrap_or(0);
    if page < 0 {
        return Err(FilterError::InvalidPage("Page must be non-negative".to_string()));
    }
    if size <= 0 {
        return Err(FilterError::InvalidLimit("Page size must be positive".to_string()));
    }
    if page.checked_mul(size).is_none() {
        return Err(FilterError::InvalidPage(format!("Page {} is out of range", page)));
    }
    Ok(PageRequest::new(page, size))
}

/// Clamp a requested sample size into `1..=max`, falling back to `default`
pub fn sample_limit(limit: Option<i64>, default: i64, max: i64) -> Result<i64, FilterError> {
    match limit {
        None => Ok(default.min(max)),
        Some(l) if l <= 0 => Err(FilterError::InvalidLimit("Limit must be positive".to_string())),
        Some(l) => {
            if l > max {
                tracing::debug!("Limit {} exceeds max {}, capping to max", l, max);
            }
            Ok(l.min(max))
        }
    }
}

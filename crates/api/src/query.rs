//! Shared query parameter types for API handlers.

use serde::Deserialize;
use sanjesh_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Listing parameters (`?status=&limit=&offset=`).
///
/// `status` is parsed by the handler against the listed entity's status enum.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListParams {
    /// Clamped `(limit, offset)`.
    pub fn window(&self) -> (i64, i64) {
        (
            clamp_limit(self.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
            clamp_offset(self.offset),
        )
    }

    /// The `status` filter, with an empty string meaning "any".
    pub fn status_filter(&self) -> Option<&str> {
        self.status.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

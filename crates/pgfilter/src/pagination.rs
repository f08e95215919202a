//! `LIMIT` / `OFFSET` pagination.

use serde::{Deserialize, Serialize};

/// Upper bound on the page size when [`Pagination::max_limit`] is unset.
pub const DEFAULT_MAX_LIMIT: u64 = 20;

/// Page-number pagination.
///
/// - `max_limit == 0` means [`DEFAULT_MAX_LIMIT`].
/// - `limit == 0` or `limit > max_limit` means `max_limit`.
/// - `page == 0` means the first page.
/// - `page == 0 && limit == 0` means no pagination at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub max_limit: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page,
            limit,
            max_limit: 0,
        }
    }

    pub fn with_max_limit(mut self, max_limit: u64) -> Self {
        self.max_limit = max_limit;
        self
    }

    /// Returns true when no pagination was requested.
    pub fn is_empty(&self) -> bool {
        self.page == 0 && self.limit == 0
    }

    /// Resolved `(limit, offset)`, or `None` when no pagination was requested.
    pub fn limit_offset(&self) -> Option<(u64, u64)> {
        if self.is_empty() {
            return None;
        }

        let max_limit = if self.max_limit == 0 {
            DEFAULT_MAX_LIMIT
        } else {
            self.max_limit
        };
        let limit = if self.limit == 0 || self.limit > max_limit {
            max_limit
        } else {
            self.limit
        };
        let page = self.page.max(1);

        Some((limit, (page - 1).saturating_mul(limit)))
    }

    /// Render `LIMIT n OFFSET m`, or an empty string when no pagination was requested.
    pub fn to_sql(&self) -> String {
        match self.limit_offset() {
            Some((limit, offset)) => format!("LIMIT {limit} OFFSET {offset}"),
            None => String::new(),
        }
    }
}

//! Limit/offset paging and the list filter shared by notes and tasks.

use chrono::{DateTime, Utc};

use super::validation::ValidationError;

/// Rows returned when the caller gives no limit.
pub const DEFAULT_LIMIT: i64 = 100;

/// Largest limit a caller may ask for.
pub const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Build a page from optional caller input, applying defaults and bounds.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, ValidationError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ValidationError::OutOfRange {
                field: "limit",
                min: 1,
                max: Some(MAX_LIMIT),
                value: limit,
            });
        }

        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(ValidationError::OutOfRange {
                field: "offset",
                min: 0,
                max: None,
                value: offset,
            });
        }

        Ok(Page { limit, offset })
    }
}

impl Default for Page {
    fn default() -> Self {
        Page {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Filter for listing notes or tasks. Absent fields match everything;
/// `date_create` matches the creation timestamp exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub name: Option<String>,
    pub date_create: Option<DateTime<Utc>>,
    pub page: Page,
}

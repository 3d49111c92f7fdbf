//! Task entity and its write shapes.

use chrono::{DateTime, Utc};

/// A stored task row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub content: Option<String>,
    pub complete: bool,
    pub date_create: DateTime<Utc>,
    pub date_update: DateTime<Utc>,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub content: Option<String>,
}

/// Partial update keyed by name. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChange {
    pub name: String,
    pub content: Option<String>,
    pub complete: Option<bool>,
    pub deleted: Option<bool>,
}

impl TaskChange {
    pub fn soft_delete(name: String) -> Self {
        Self {
            name,
            deleted: Some(true),
            ..Self::default()
        }
    }
}

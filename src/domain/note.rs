//! Note entity and its write shapes.

use chrono::{DateTime, Utc};

/// A stored note row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Note {
    pub id: i64,
    pub name: String,
    pub content: Option<String>,
    pub date_create: DateTime<Utc>,
    pub date_update: DateTime<Utc>,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub name: String,
    pub content: Option<String>,
}

/// Partial update keyed by name. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteChange {
    pub name: String,
    pub content: Option<String>,
    pub deleted: Option<bool>,
}

impl NoteChange {
    pub fn content(name: String, content: Option<String>) -> Self {
        Self {
            name,
            content,
            deleted: None,
        }
    }

    /// Soft delete: flag the note as deleted and leave everything else alone.
    pub fn soft_delete(name: String) -> Self {
        Self {
            name,
            content: None,
            deleted: Some(true),
        }
    }
}

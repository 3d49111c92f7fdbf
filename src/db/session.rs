//! Storage contract shared by the PostgreSQL and in-memory backends.

use async_trait::async_trait;

use super::DbError;
use crate::domain::{
    ListFilter, NewNote, NewRecord, NewTask, Note, NoteChange, Record, RecordChange, RecordFilter,
    Task, TaskChange,
};

/// Source of sessions. Implementations own the connection pool.
#[async_trait]
pub trait Backend: Send + Sync {
    /// A session whose statements commit individually.
    async fn connect(&self) -> Result<Box<dyn Session>, DbError>;

    /// A session wrapped in a transaction; nothing is visible to other
    /// sessions until `commit`.
    async fn begin(&self) -> Result<Box<dyn Session>, DbError>;
}

/// One connection's worth of statements.
///
/// Update and delete statements return every affected row; callers decide
/// what an empty result means.
#[async_trait]
pub trait Session: Send {
    async fn ping(&mut self) -> Result<(), DbError>;

    async fn select_notes(&mut self, filter: &ListFilter) -> Result<Vec<Note>, DbError>;
    async fn insert_note(&mut self, note: &NewNote) -> Result<Note, DbError>;
    async fn update_notes(&mut self, change: &NoteChange) -> Result<Vec<Note>, DbError>;

    async fn select_tasks(&mut self, filter: &ListFilter) -> Result<Vec<Task>, DbError>;
    async fn insert_task(&mut self, task: &NewTask) -> Result<Task, DbError>;
    async fn update_tasks(&mut self, change: &TaskChange) -> Result<Vec<Task>, DbError>;

    async fn select_records(&mut self, filter: &RecordFilter) -> Result<Vec<Record>, DbError>;
    async fn insert_record(&mut self, record: &NewRecord) -> Result<Record, DbError>;
    async fn update_records(&mut self, change: &RecordChange) -> Result<Vec<Record>, DbError>;
    async fn delete_records(&mut self, name: &str) -> Result<Vec<Record>, DbError>;

    /// Commit a transactional session. A no-op for autocommit sessions.
    async fn commit(self: Box<Self>) -> Result<(), DbError>;

    /// Roll back a transactional session. A no-op for autocommit sessions.
    async fn rollback(self: Box<Self>) -> Result<(), DbError>;
}

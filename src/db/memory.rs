//! In-memory backend with the same observable behavior as the PostgreSQL
//! one: unique names, id ordering, paging and real rollback.
//!
//! A transactional session holds the store lock for its whole lifetime and
//! restores a snapshot unless it is committed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Backend, DbError, Session};
use crate::domain::{
    ListFilter, NewNote, NewRecord, NewTask, Note, NoteChange, Page, Record, RecordChange,
    RecordFilter, Task, TaskChange,
};

#[derive(Debug, Clone, Default)]
struct Store {
    notes: Vec<Note>,
    tasks: Vec<Task>,
    records: Vec<Record>,
    last_note_id: i64,
    last_task_id: i64,
    last_record_id: i64,
}

fn page<T>(rows: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    rows.skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

fn unique_violation(constraint: &str) -> DbError {
    DbError::UniqueViolation {
        constraint: Some(constraint.to_string()),
    }
}

impl Store {
    fn select_notes(&self, filter: &ListFilter) -> Vec<Note> {
        let rows = self.notes.iter().filter(|n| {
            filter.name.as_ref().map_or(true, |name| &n.name == name)
                && filter.date_create.map_or(true, |at| n.date_create == at)
        });
        page(rows.cloned(), filter.page)
    }

    fn insert_note(&mut self, note: &NewNote) -> Result<Note, DbError> {
        if self.notes.iter().any(|n| n.name == note.name) {
            return Err(unique_violation("notes_name_key"));
        }
        self.last_note_id += 1;
        let now = Utc::now();
        let row = Note {
            id: self.last_note_id,
            name: note.name.clone(),
            content: note.content.clone(),
            date_create: now,
            date_update: now,
            deleted: false,
        };
        self.notes.push(row.clone());
        Ok(row)
    }

    fn update_notes(&mut self, change: &NoteChange) -> Vec<Note> {
        let now = Utc::now();
        let mut updated = Vec::new();
        for row in self.notes.iter_mut().filter(|n| n.name == change.name) {
            if let Some(content) = &change.content {
                row.content = Some(content.clone());
            }
            if let Some(deleted) = change.deleted {
                row.deleted = deleted;
            }
            row.date_update = now;
            updated.push(row.clone());
        }
        updated
    }

    fn select_tasks(&self, filter: &ListFilter) -> Vec<Task> {
        let rows = self.tasks.iter().filter(|t| {
            filter.name.as_ref().map_or(true, |name| &t.name == name)
                && filter.date_create.map_or(true, |at| t.date_create == at)
        });
        page(rows.cloned(), filter.page)
    }

    fn insert_task(&mut self, task: &NewTask) -> Result<Task, DbError> {
        if self.tasks.iter().any(|t| t.name == task.name) {
            return Err(unique_violation("tasks_name_key"));
        }
        self.last_task_id += 1;
        let now = Utc::now();
        let row = Task {
            id: self.last_task_id,
            name: task.name.clone(),
            content: task.content.clone(),
            complete: false,
            date_create: now,
            date_update: now,
            deleted: false,
        };
        self.tasks.push(row.clone());
        Ok(row)
    }

    fn update_tasks(&mut self, change: &TaskChange) -> Vec<Task> {
        let now = Utc::now();
        let mut updated = Vec::new();
        for row in self.tasks.iter_mut().filter(|t| t.name == change.name) {
            if let Some(content) = &change.content {
                row.content = Some(content.clone());
            }
            if let Some(complete) = change.complete {
                row.complete = complete;
            }
            if let Some(deleted) = change.deleted {
                row.deleted = deleted;
            }
            row.date_update = now;
            updated.push(row.clone());
        }
        updated
    }

    fn select_records(&self, filter: &RecordFilter) -> Vec<Record> {
        let rows = self
            .records
            .iter()
            .filter(|r| filter.name.as_ref().map_or(true, |name| &r.name == name));
        page(rows.cloned(), filter.page)
    }

    fn insert_record(&mut self, record: &NewRecord) -> Result<Record, DbError> {
        if self.records.iter().any(|r| r.name == record.name) {
            return Err(unique_violation("internal_name_key"));
        }
        self.last_record_id += 1;
        let row = Record {
            id: self.last_record_id,
            name: record.name.clone(),
            value: record.value.clone(),
        };
        self.records.push(row.clone());
        Ok(row)
    }

    fn update_records(&mut self, change: &RecordChange) -> Vec<Record> {
        let mut updated = Vec::new();
        for row in self.records.iter_mut().filter(|r| r.name == change.name) {
            if let Some(value) = &change.value {
                row.value = value.clone();
            }
            updated.push(row.clone());
        }
        updated
    }

    fn delete_records(&mut self, name: &str) -> Vec<Record> {
        let (removed, kept): (Vec<Record>, Vec<Record>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| r.name == name);
        self.records = kept;
        removed
    }
}

/// Process-local backend used by tests and local experiments.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    store: Arc<Mutex<Store>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn connect(&self) -> Result<Box<dyn Session>, DbError> {
        Ok(Box::new(MemorySession::Autocommit(Arc::clone(&self.store))))
    }

    async fn begin(&self) -> Result<Box<dyn Session>, DbError> {
        let guard = Arc::clone(&self.store).lock_owned().await;
        let snapshot = Some(guard.clone());
        Ok(Box::new(MemorySession::Tx { guard, snapshot }))
    }
}

enum MemorySession {
    Autocommit(Arc<Mutex<Store>>),
    Tx {
        guard: OwnedMutexGuard<Store>,
        /// State to restore on drop; cleared by commit.
        snapshot: Option<Store>,
    },
}

impl MemorySession {
    async fn with_store<T>(&mut self, op: impl FnOnce(&mut Store) -> T + Send) -> T {
        match self {
            MemorySession::Autocommit(store) => {
                let mut store = store.lock().await;
                op(&mut *store)
            }
            MemorySession::Tx { guard, .. } => op(&mut **guard),
        }
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        if let MemorySession::Tx { guard, snapshot } = self {
            if let Some(snapshot) = snapshot.take() {
                **guard = snapshot;
            }
        }
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn ping(&mut self) -> Result<(), DbError> {
        Ok(())
    }

    async fn select_notes(&mut self, filter: &ListFilter) -> Result<Vec<Note>, DbError> {
        Ok(self.with_store(|s| s.select_notes(filter)).await)
    }

    async fn insert_note(&mut self, note: &NewNote) -> Result<Note, DbError> {
        self.with_store(|s| s.insert_note(note)).await
    }

    async fn update_notes(&mut self, change: &NoteChange) -> Result<Vec<Note>, DbError> {
        Ok(self.with_store(|s| s.update_notes(change)).await)
    }

    async fn select_tasks(&mut self, filter: &ListFilter) -> Result<Vec<Task>, DbError> {
        Ok(self.with_store(|s| s.select_tasks(filter)).await)
    }

    async fn insert_task(&mut self, task: &NewTask) -> Result<Task, DbError> {
        self.with_store(|s| s.insert_task(task)).await
    }

    async fn update_tasks(&mut self, change: &TaskChange) -> Result<Vec<Task>, DbError> {
        Ok(self.with_store(|s| s.update_tasks(change)).await)
    }

    async fn select_records(&mut self, filter: &RecordFilter) -> Result<Vec<Record>, DbError> {
        Ok(self.with_store(|s| s.select_records(filter)).await)
    }

    async fn insert_record(&mut self, record: &NewRecord) -> Result<Record, DbError> {
        self.with_store(|s| s.insert_record(record)).await
    }

    async fn update_records(&mut self, change: &RecordChange) -> Result<Vec<Record>, DbError> {
        Ok(self.with_store(|s| s.update_records(change)).await)
    }

    async fn delete_records(&mut self, name: &str) -> Result<Vec<Record>, DbError> {
        Ok(self.with_store(|s| s.delete_records(name)).await)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), DbError> {
        if let MemorySession::Tx { snapshot, .. } = &mut *self {
            *snapshot = None;
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DbError> {
        drop(self);
        Ok(())
    }
}

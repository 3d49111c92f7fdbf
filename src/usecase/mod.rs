//! Business operations between the HTTP handlers and the repository.
//!
//! Writes that must be atomic run through [`Repository::transaction`];
//! plain reads and soft deletes run on autocommit sessions.

pub mod internal;
pub mod notes;
pub mod tasks;

pub use internal::InternalUsecase;
pub use notes::NotesUsecase;
pub use tasks::TasksUsecase;

use crate::error::AppError;

/// First affected row, or [`AppError::EmptyResult`] when nothing matched.
fn first_row<T>(rows: Vec<T>) -> Result<T, AppError> {
    rows.into_iter().next().ok_or(AppError::EmptyResult)
}

#[cfg(test)]
pub(crate) fn memory_repo() -> std::sync::Arc<crate::db::Repository> {
    use crate::db::{Driver, MemoryBackend, Repository};
    use std::sync::Arc;

    Arc::new(Repository::new(Arc::new(Driver::new(Arc::new(
        MemoryBackend::new(),
    )))))
}

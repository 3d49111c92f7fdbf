use std::sync::Arc;

use super::first_row;
use crate::db::{DbError, Repository};
use crate::domain::{ListFilter, NewNote, Note, NoteChange};
use crate::error::AppError;

/// Maps a name collision to the note-specific error; anything else is internal.
fn note_write_error(on_conflict: AppError) -> impl FnOnce(DbError) -> AppError {
    move |err| {
        if err.is_unique_violation() {
            on_conflict
        } else {
            AppError::Database(err)
        }
    }
}

#[derive(Clone)]
pub struct NotesUsecase {
    repo: Arc<Repository>,
}

impl NotesUsecase {
    pub fn new(repo: Arc<Repository>) -> Self {
        NotesUsecase { repo }
    }

    pub async fn get(&self, filter: &ListFilter) -> Result<Vec<Note>, AppError> {
        Ok(self.repo.select_notes(filter).await?)
    }

    pub async fn create(&self, note: NewNote) -> Result<Note, AppError> {
        self.repo
            .transaction(|| async {
                self.repo
                    .insert_note(&note)
                    .await
                    .map_err(note_write_error(AppError::NoteCreate))
            })
            .await
    }

    pub async fn update(&self, change: NoteChange) -> Result<Note, AppError> {
        self.repo
            .transaction(|| async {
                let rows = self
                    .repo
                    .update_notes(&change)
                    .await
                    .map_err(note_write_error(AppError::NoteUpdate))?;
                first_row(rows)
            })
            .await
    }

    /// Soft delete: the row stays and is flagged `deleted`.
    pub async fn delete(&self, name: String) -> Result<Note, AppError> {
        let rows = self.repo.update_notes(&NoteChange::soft_delete(name)).await?;
        first_row(rows)
    }
}

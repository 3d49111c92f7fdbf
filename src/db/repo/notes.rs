//! Note operations for the repository.

use crate::db::DbError;
use crate::domain::{ListFilter, NewNote, Note, NoteChange};

use super::Repository;

impl Repository {
    /// List notes matching the filter, ordered by id.
    pub async fn select_notes(&self, filter: &ListFilter) -> Result<Vec<Note>, DbError> {
        let mut session = self.driver.session().await?;
        session.select_notes(filter).await
    }

    /// Insert a note and return the stored row.
    ///
    /// # Errors
    /// Returns [`DbError::UniqueViolation`] if the name is taken.
    pub async fn insert_note(&self, note: &NewNote) -> Result<Note, DbError> {
        let mut session = self.driver.session().await?;
        session.insert_note(note).await
    }

    /// Apply a partial update to every note with the given name.
    pub async fn update_notes(&self, change: &NoteChange) -> Result<Vec<Note>, DbError> {
        let mut session = self.driver.session().await?;
        session.update_notes(change).await
    }
}

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::envelope::Reply;
use super::extractors::{ApiJson, ApiQuery};
use super::{AppState, ListQuery, NameQuery};
use crate::domain::{validate_name, NewNote, Note, NoteChange};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct NoteBody {
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NoteView {
    pub name: String,
    pub content: Option<String>,
    pub date_create: DateTime<Utc>,
    pub date_update: DateTime<Utc>,
    pub deleted: bool,
}

impl From<Note> for NoteView {
    fn from(note: Note) -> Self {
        NoteView {
            name: note.name,
            content: note.content,
            date_create: note.date_create,
            date_update: note.date_update,
            deleted: note.deleted,
        }
    }
}

pub async fn list_notes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Reply<Vec<NoteView>>, AppError> {
    let filter = query.into_filter()?;
    let notes = state.notes.get(&filter).await?;
    Ok(Reply::ok(notes.into_iter().map(NoteView::from).collect()))
}

pub async fn create_note(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NoteBody>,
) -> Result<Reply<NoteView>, AppError> {
    validate_name("name", &body.name)?;
    let note = state
        .notes
        .create(NewNote {
            name: body.name,
            content: body.content,
        })
        .await?;
    Ok(Reply::created(note.into()))
}

pub async fn update_note(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NoteBody>,
) -> Result<Reply<NoteView>, AppError> {
    validate_name("name", &body.name)?;
    let note = state
        .notes
        .update(NoteChange::content(body.name, body.content))
        .await?;
    Ok(Reply::ok(note.into()))
}

pub async fn delete_note(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NameQuery>,
) -> Result<Reply<NoteView>, AppError> {
    validate_name("name", &query.name)?;
    let note = state.notes.delete(query.name).await?;
    Ok(Reply::ok(note.into()))
}

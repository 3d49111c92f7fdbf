use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span, Instrument};

use crate::config::Config;
use crate::context::{self, TxId};
use crate::db::{init_db, Driver, PgBackend, Repository};
use crate::domain::{validate_name, NewNote, Note};
use crate::usecase::NotesUsecase;

/// Insert one note into the configured database.
pub async fn create_note(config: Config, name: String, content: String) -> Result<()> {
    validate_name("name", &name)?;
    if let Some(flag) = config.cli.as_ref().and_then(|cli| cli.debug.as_deref()) {
        debug!(cli_debug = flag, "CLI debug setting");
    }

    let pool = init_db(config.postgres()?)
        .await
        .context("failed to initialize database")?;
    let repo = Arc::new(Repository::new(Arc::new(Driver::new(Arc::new(
        PgBackend::new(pool),
    )))));

    create_note_with(repo, name, content).await?;
    Ok(())
}

/// Insert one note through `repo` under a single transaction id.
pub async fn create_note_with(
    repo: Arc<Repository>,
    name: String,
    content: String,
) -> Result<Note> {
    validate_name("name", &name)?;

    let tx_id = TxId::generate();
    let span = info_span!("cli", request_id = %tx_id);

    context::scope(tx_id, async {
        let note = NotesUsecase::new(repo)
            .create(NewNote {
                name,
                content: Some(content),
            })
            .await?;
        info!(
            id = note.id,
            name = %note.name,
            date_create = %note.date_create,
            "note created"
        );
        Ok::<_, anyhow::Error>(note)
    })
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ListFilter, ValidationError};
    use crate::error::AppError;
    use crate::usecase::memory_repo;

    #[tokio::test]
    async fn test_create_note_inserts_row() {
        let repo = memory_repo();
        let note = create_note_with(Arc::clone(&repo), "n1".into(), "body".into())
            .await
            .unwrap();

        assert_eq!(note.name, "n1");
        assert_eq!(note.content.as_deref(), Some("body"));
        let rows = repo.select_notes(&ListFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(context::current(), None);
    }

    #[tokio::test]
    async fn test_create_note_duplicate_name_fails() {
        let repo = memory_repo();
        create_note_with(Arc::clone(&repo), "n1".into(), "a".into())
            .await
            .unwrap();

        let err = create_note_with(Arc::clone(&repo), "n1".into(), "b".into())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::NoteCreate)
        ));
        let rows = repo.select_notes(&ListFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_create_note_rejects_empty_name() {
        let repo = memory_repo();
        let err = create_note_with(Arc::clone(&repo), String::new(), "body".into())
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::Empty { field: "name" })
        );
        let rows = repo.select_notes(&ListFilter::default()).await.unwrap();
        assert!(rows.is_empty());
    }
}

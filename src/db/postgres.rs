//! PostgreSQL backend.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};

use super::{Backend, DbError, Session};
use crate::config::PostgresSettings;
use crate::domain::{
    ListFilter, NewNote, NewRecord, NewTask, Note, NoteChange, Record, RecordChange, RecordFilter,
    Task, TaskChange,
};

const NOTE_COLUMNS: &str = "id, name, content, date_create, date_update, deleted";
const TASK_COLUMNS: &str = "id, name, content, complete, date_create, date_update, deleted";
const RECORD_COLUMNS: &str = "id, name, value";

/// Build a connection pool from `PG__*` settings. Connections are opened lazily.
pub fn connect_pool(settings: &PostgresSettings) -> PgPool {
    let options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.username)
        .password(&settings.password)
        .database(&settings.db);

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
        .connect_lazy_with(options)
}

#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        PgBackend { pool }
    }
}

#[async_trait]
impl Backend for PgBackend {
    async fn connect(&self) -> Result<Box<dyn Session>, DbError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgSession::Pooled(conn)))
    }

    async fn begin(&self) -> Result<Box<dyn Session>, DbError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSession::Tx(tx)))
    }
}

pub enum PgSession {
    Pooled(PoolConnection<Postgres>),
    Tx(Transaction<'static, Postgres>),
}

impl PgSession {
    fn conn(&mut self) -> &mut PgConnection {
        match self {
            PgSession::Pooled(conn) => &mut **conn,
            PgSession::Tx(tx) => &mut **tx,
        }
    }
}

#[async_trait]
impl Session for PgSession {
    async fn ping(&mut self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(self.conn()).await?;
        Ok(())
    }

    // =========================================================================
    // Notes
    // =========================================================================

    async fn select_notes(&mut self, filter: &ListFilter) -> Result<Vec<Note>, DbError> {
        let sql = format!(
            r#"
            SELECT {NOTE_COLUMNS}
            FROM notes
            WHERE ($1::text IS NULL OR name = $1)
              AND ($2::timestamptz IS NULL OR date_create = $2)
            ORDER BY id
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, Note>(&sql)
            .bind(filter.name.as_deref())
            .bind(filter.date_create)
            .bind(filter.page.limit)
            .bind(filter.page.offset)
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }

    async fn insert_note(&mut self, note: &NewNote) -> Result<Note, DbError> {
        let sql = format!(
            "INSERT INTO notes (name, content) VALUES ($1, $2) RETURNING {NOTE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Note>(&sql)
            .bind(&note.name)
            .bind(note.content.as_deref())
            .fetch_one(self.conn())
            .await?;
        Ok(row)
    }

    async fn update_notes(&mut self, change: &NoteChange) -> Result<Vec<Note>, DbError> {
        let sql = format!(
            r#"
            UPDATE notes
            SET content = COALESCE($2, content),
                deleted = COALESCE($3, deleted),
                date_update = now()
            WHERE name = $1
            RETURNING {NOTE_COLUMNS}
            "#
        );
        let rows = sqlx::query_as::<_, Note>(&sql)
            .bind(&change.name)
            .bind(change.content.as_deref())
            .bind(change.deleted)
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    async fn select_tasks(&mut self, filter: &ListFilter) -> Result<Vec<Task>, DbError> {
        let sql = format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE ($1::text IS NULL OR name = $1)
              AND ($2::timestamptz IS NULL OR date_create = $2)
            ORDER BY id
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, Task>(&sql)
            .bind(filter.name.as_deref())
            .bind(filter.date_create)
            .bind(filter.page.limit)
            .bind(filter.page.offset)
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }

    async fn insert_task(&mut self, task: &NewTask) -> Result<Task, DbError> {
        let sql = format!(
            "INSERT INTO tasks (name, content) VALUES ($1, $2) RETURNING {TASK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(&task.name)
            .bind(task.content.as_deref())
            .fetch_one(self.conn())
            .await?;
        Ok(row)
    }

    async fn update_tasks(&mut self, change: &TaskChange) -> Result<Vec<Task>, DbError> {
        let sql = format!(
            r#"
            UPDATE tasks
            SET content = COALESCE($2, content),
                complete = COALESCE($3, complete),
                deleted = COALESCE($4, deleted),
                date_update = now()
            WHERE name = $1
            RETURNING {TASK_COLUMNS}
            "#
        );
        let rows = sqlx::query_as::<_, Task>(&sql)
            .bind(&change.name)
            .bind(change.content.as_deref())
            .bind(change.complete)
            .bind(change.deleted)
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }

    // =========================================================================
    // Internal records
    // =========================================================================

    async fn select_records(&mut self, filter: &RecordFilter) -> Result<Vec<Record>, DbError> {
        let sql = format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM internal
            WHERE ($1::text IS NULL OR name = $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, Record>(&sql)
            .bind(filter.name.as_deref())
            .bind(filter.page.limit)
            .bind(filter.page.offset)
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }

    async fn insert_record(&mut self, record: &NewRecord) -> Result<Record, DbError> {
        let sql = format!(
            "INSERT INTO internal (name, value) VALUES ($1, $2) RETURNING {RECORD_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Record>(&sql)
            .bind(&record.name)
            .bind(&record.value)
            .fetch_one(self.conn())
            .await?;
        Ok(row)
    }

    async fn update_records(&mut self, change: &RecordChange) -> Result<Vec<Record>, DbError> {
        let sql = format!(
            r#"
            UPDATE internal
            SET value = COALESCE($2, value)
            WHERE name = $1
            RETURNING {RECORD_COLUMNS}
            "#
        );
        let rows = sqlx::query_as::<_, Record>(&sql)
            .bind(&change.name)
            .bind(change.value.as_deref())
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }

    async fn delete_records(&mut self, name: &str) -> Result<Vec<Record>, DbError> {
        let sql = format!("DELETE FROM internal WHERE name = $1 RETURNING {RECORD_COLUMNS}");
        let rows = sqlx::query_as::<_, Record>(&sql)
            .bind(name)
            .fetch_all(self.conn())
            .await?;
        Ok(rows)
    }

    async fn commit(self: Box<Self>) -> Result<(), DbError> {
        match *self {
            PgSession::Tx(tx) => tx.commit().await?,
            PgSession::Pooled(_) => {}
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DbError> {
        match *self {
            PgSession::Tx(tx) => tx.rollback().await?,
            PgSession::Pooled(_) => {}
        }
        Ok(())
    }
}

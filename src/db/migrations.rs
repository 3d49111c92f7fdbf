//! Database migrations and initialization.

use sqlx::postgres::PgPool;
use tracing::info;

use super::postgres::connect_pool;
use crate::config::PostgresSettings;

/// Connect to PostgreSQL, apply the schema and verify the connection.
pub async fn init_db(settings: &PostgresSettings) -> Result<PgPool, sqlx::Error> {
    let pool = connect_pool(settings);
    run_migrations(&pool).await?;

    info!(
        "Database initialized at {}:{}/{}",
        settings.host, settings.port, settings.db
    );
    Ok(pool)
}

/// Run all database migrations. Every statement is idempotent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");
    let schema_sql = include_str!("schema.sql");

    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    info!("Migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        PgPool::connect(&url).await.expect("connect failed")
    }

    #[test]
    fn test_schema_statements_are_idempotent() {
        let statements: Vec<_> = include_str!("schema.sql")
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        assert_eq!(statements.len(), 5);
        assert!(statements.iter().all(|s| s.contains("IF NOT EXISTS")));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_migrations_create_tables() {
        let pool = test_pool().await;
        run_migrations(&pool).await.expect("migration failed");

        for table in ["notes", "tasks", "internal"] {
            let result: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = $1",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .expect("query failed");
            assert_eq!(result.0, 1, "missing table {table}");
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_migrations_idempotent() {
        let pool = test_pool().await;
        run_migrations(&pool).await.expect("first migration run failed");
        run_migrations(&pool)
            .await
            .expect("second migration run failed");
    }
}

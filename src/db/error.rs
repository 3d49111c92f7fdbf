use thiserror::Error;

use crate::context::TxId;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("unique constraint violated: {}", .constraint.as_deref().unwrap_or("unknown"))]
    UniqueViolation { constraint: Option<String> },
    #[error("transaction {0} still has live session handles at completion")]
    TransactionBusy(TxId),
    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return DbError::UniqueViolation {
                    constraint: db_err.constraint().map(str::to_string),
                };
            }
        }
        DbError::Sqlx(err)
    }
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }
}

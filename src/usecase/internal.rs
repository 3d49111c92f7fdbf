//! Diagnostics operations behind `/_internal/v1/postgres`.
//!
//! The transactional variants first run a probe select, then write, all in
//! one transaction. The failing variants raise after the write so the
//! rollback path can be exercised end to end.

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use tracing::warn;

use super::first_row;
use crate::db::Repository;
use crate::domain::{NewRecord, Page, Record, RecordChange, RecordFilter};
use crate::error::AppError;

/// How a transactional write ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Commit,
    /// Fail after the write so the transaction rolls back.
    ForceRollback,
}

#[derive(Clone)]
pub struct InternalUsecase {
    repo: Arc<Repository>,
}

impl InternalUsecase {
    pub fn new(repo: Arc<Repository>) -> Self {
        InternalUsecase { repo }
    }

    pub async fn get(&self, filter: &RecordFilter) -> Result<Vec<Record>, AppError> {
        Ok(self.repo.select_records(filter).await?)
    }

    pub async fn create(&self, record: NewRecord) -> Result<Record, AppError> {
        Ok(self.repo.insert_record(&record).await?)
    }

    pub async fn update(&self, change: RecordChange) -> Result<Record, AppError> {
        first_row(self.repo.update_records(&change).await?)
    }

    pub async fn delete(&self, name: String) -> Result<Record, AppError> {
        first_row(self.repo.delete_records(&name).await?)
    }

    pub async fn create_in_transaction(
        &self,
        record: NewRecord,
        outcome: Outcome,
    ) -> Result<Record, AppError> {
        self.probed(|| self.create(record), outcome).await
    }

    pub async fn update_in_transaction(
        &self,
        change: RecordChange,
        outcome: Outcome,
    ) -> Result<Record, AppError> {
        self.probed(|| self.update(change), outcome).await
    }

    pub async fn delete_in_transaction(
        &self,
        name: String,
        outcome: Outcome,
    ) -> Result<Record, AppError> {
        self.probed(|| self.delete(name), outcome).await
    }

    async fn probed<T, F, Fut>(&self, write: F, outcome: Outcome) -> Result<T, AppError>
    where
        T: Debug,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        self.repo
            .transaction(|| async {
                let probe = RecordFilter {
                    name: Some("1".to_string()),
                    page: Page {
                        limit: 1,
                        offset: 0,
                    },
                };
                self.repo.select_records(&probe).await?;

                let written = write().await?;
                if outcome == Outcome::ForceRollback {
                    warn!(?written, "forcing rollback after write");
                    return Err(AppError::Internal(
                        "forced failure after write".to_string(),
                    ));
                }
                Ok(written)
            })
            .await
    }
}

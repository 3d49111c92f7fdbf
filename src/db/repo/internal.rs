//! Internal record operations for the repository.

use crate::db::DbError;
use crate::domain::{NewRecord, Record, RecordChange, RecordFilter};

use super::Repository;

impl Repository {
    pub async fn select_records(&self, filter: &RecordFilter) -> Result<Vec<Record>, DbError> {
        let mut session = self.driver.session().await?;
        session.select_records(filter).await
    }

    pub async fn insert_record(&self, record: &NewRecord) -> Result<Record, DbError> {
        let mut session = self.driver.session().await?;
        session.insert_record(record).await
    }

    pub async fn update_records(&self, change: &RecordChange) -> Result<Vec<Record>, DbError> {
        let mut session = self.driver.session().await?;
        session.update_records(change).await
    }

    /// Hard delete every record with the given name.
    pub async fn delete_records(&self, name: &str) -> Result<Vec<Record>, DbError> {
        let mut session = self.driver.session().await?;
        session.delete_records(name).await
    }
}

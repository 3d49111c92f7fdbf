//! Task operations for the repository.

use crate::db::DbError;
use crate::domain::{ListFilter, NewTask, Task, TaskChange};

use super::Repository;

impl Repository {
    pub async fn select_tasks(&self, filter: &ListFilter) -> Result<Vec<Task>, DbError> {
        let mut session = self.driver.session().await?;
        session.select_tasks(filter).await
    }

    pub async fn insert_task(&self, task: &NewTask) -> Result<Task, DbError> {
        let mut session = self.driver.session().await?;
        session.insert_task(task).await
    }

    pub async fn update_tasks(&self, change: &TaskChange) -> Result<Vec<Task>, DbError> {
        let mut session = self.driver.session().await?;
        session.update_tasks(change).await
    }
}

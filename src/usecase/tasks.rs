use std::sync::Arc;

use super::first_row;
use crate::db::Repository;
use crate::domain::{ListFilter, NewTask, Task, TaskChange};
use crate::error::AppError;

#[derive(Clone)]
pub struct TasksUsecase {
    repo: Arc<Repository>,
}

impl TasksUsecase {
    pub fn new(repo: Arc<Repository>) -> Self {
        TasksUsecase { repo }
    }

    pub async fn get(&self, filter: &ListFilter) -> Result<Vec<Task>, AppError> {
        Ok(self.repo.select_tasks(filter).await?)
    }

    pub async fn create(&self, task: NewTask) -> Result<Task, AppError> {
        self.repo
            .transaction(|| async { self.repo.insert_task(&task).await.map_err(AppError::from) })
            .await
    }

    pub async fn update(&self, change: TaskChange) -> Result<Task, AppError> {
        self.repo
            .transaction(|| async { first_row(self.repo.update_tasks(&change).await?) })
            .await
    }

    pub async fn delete(&self, name: String) -> Result<Task, AppError> {
        first_row(self.repo.update_tasks(&TaskChange::soft_delete(name)).await?)
    }
}

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::envelope::Reply;
use super::extractors::{ApiJson, ApiQuery};
use super::{AppState, ListQuery, NameQuery};
use crate::domain::{validate_name, NewTask, Task, TaskChange};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CreateTaskBody {
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskBody {
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub complete: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TaskView {
    pub name: String,
    pub content: Option<String>,
    pub complete: bool,
    pub date_create: DateTime<Utc>,
    pub date_update: DateTime<Utc>,
    pub deleted: bool,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        TaskView {
            name: task.name,
            content: task.content,
            complete: task.complete,
            date_create: task.date_create,
            date_update: task.date_update,
            deleted: task.deleted,
        }
    }
}

pub async fn list_tasks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Reply<Vec<TaskView>>, AppError> {
    let filter = query.into_filter()?;
    let tasks = state.tasks.get(&filter).await?;
    Ok(Reply::ok(tasks.into_iter().map(TaskView::from).collect()))
}

pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateTaskBody>,
) -> Result<Reply<TaskView>, AppError> {
    validate_name("name", &body.name)?;
    let task = state
        .tasks
        .create(NewTask {
            name: body.name,
            content: body.content,
        })
        .await?;
    Ok(Reply::created(task.into()))
}

pub async fn update_task(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateTaskBody>,
) -> Result<Reply<TaskView>, AppError> {
    validate_name("name", &body.name)?;
    let task = state
        .tasks
        .update(TaskChange {
            name: body.name,
            content: body.content,
            complete: body.complete,
            deleted: None,
        })
        .await?;
    Ok(Reply::ok(task.into()))
}

pub async fn delete_task(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NameQuery>,
) -> Result<Reply<TaskView>, AppError> {
    validate_name("name", &query.name)?;
    let task = state.tasks.delete(query.name).await?;
    Ok(Reply::ok(task.into()))
}

//! `/_internal/v1/postgres` diagnostics endpoints.
//!
//! - `simple/` runs each operation on its own autocommit session
//! - `transaction/` wraps a probe select and the write in one transaction
//! - `transaction_exception/` does the same, then fails so the write is rolled back

use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::envelope::Reply;
use super::extractors::{ApiJson, ApiQuery};
use super::{AppState, NameQuery};
use crate::domain::{validate_name, NewRecord, Page, Record, RecordChange, RecordFilter};
use crate::error::AppError;
use crate::usecase::internal::Outcome;

#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordBody {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRecordBody {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordView {
    pub id: i64,
    pub name: String,
    pub value: String,
}

impl From<Record> for RecordView {
    fn from(record: Record) -> Self {
        RecordView {
            id: record.id,
            name: record.name,
            value: record.value,
        }
    }
}

impl CreateRecordBody {
    fn validated(self) -> Result<NewRecord, AppError> {
        validate_name("name", &self.name)?;
        Ok(NewRecord {
            name: self.name,
            value: self.value,
        })
    }
}

impl UpdateRecordBody {
    fn validated(self) -> Result<RecordChange, AppError> {
        validate_name("name", &self.name)?;
        Ok(RecordChange {
            name: self.name,
            value: self.value,
        })
    }
}

// =========================================================================
// simple/
// =========================================================================

pub async fn list_records(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecordQuery>,
) -> Result<Reply<Vec<RecordView>>, AppError> {
    let filter = RecordFilter {
        name: query.name,
        page: Page::new(query.limit, query.offset)?,
    };
    let records = state.internal.get(&filter).await?;
    Ok(Reply::ok(records.into_iter().map(RecordView::from).collect()))
}

pub async fn create_record(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateRecordBody>,
) -> Result<Reply<RecordView>, AppError> {
    let record = state.internal.create(body.validated()?).await?;
    Ok(Reply::created(record.into()))
}

pub async fn update_record(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateRecordBody>,
) -> Result<Reply<RecordView>, AppError> {
    let record = state.internal.update(body.validated()?).await?;
    Ok(Reply::ok(record.into()))
}

pub async fn delete_record(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NameQuery>,
) -> Result<Reply<RecordView>, AppError> {
    validate_name("name", &query.name)?;
    let record = state.internal.delete(query.name).await?;
    Ok(Reply::ok(record.into()))
}

// =========================================================================
// transaction/ and transaction_exception/
// =========================================================================

async fn create_with(
    state: AppState,
    body: CreateRecordBody,
    outcome: Outcome,
) -> Result<Reply<RecordView>, AppError> {
    let record = state
        .internal
        .create_in_transaction(body.validated()?, outcome)
        .await?;
    Ok(Reply::created(record.into()))
}

async fn update_with(
    state: AppState,
    body: UpdateRecordBody,
    outcome: Outcome,
) -> Result<Reply<RecordView>, AppError> {
    let record = state
        .internal
        .update_in_transaction(body.validated()?, outcome)
        .await?;
    Ok(Reply::ok(record.into()))
}

async fn delete_with(
    state: AppState,
    query: NameQuery,
    outcome: Outcome,
) -> Result<Reply<RecordView>, AppError> {
    validate_name("name", &query.name)?;
    let record = state
        .internal
        .delete_in_transaction(query.name, outcome)
        .await?;
    Ok(Reply::ok(record.into()))
}

pub async fn create_record_tx(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateRecordBody>,
) -> Result<Reply<RecordView>, AppError> {
    create_with(state, body, Outcome::Commit).await
}

pub async fn update_record_tx(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateRecordBody>,
) -> Result<Reply<RecordView>, AppError> {
    update_with(state, body, Outcome::Commit).await
}

pub async fn delete_record_tx(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NameQuery>,
) -> Result<Reply<RecordView>, AppError> {
    delete_with(state, query, Outcome::Commit).await
}

pub async fn create_record_tx_failing(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateRecordBody>,
) -> Result<Reply<RecordView>, AppError> {
    create_with(state, body, Outcome::ForceRollback).await
}

pub async fn update_record_tx_failing(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateRecordBody>,
) -> Result<Reply<RecordView>, AppError> {
    update_with(state, body, Outcome::ForceRollback).await
}

pub async fn delete_record_tx_failing(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NameQuery>,
) -> Result<Reply<RecordView>, AppError> {
    delete_with(state, query, Outcome::ForceRollback).await
}

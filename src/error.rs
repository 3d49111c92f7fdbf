use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::api::envelope::Envelope;
use crate::db::DbError;
use crate::domain::ValidationError;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Error)]
pub enum AppError {
    /// A lookup or update matched no rows. Reported with status 200.
    #[error("empty result.")]
    EmptyResult,
    #[error("can`t create notes")]
    NoteCreate,
    #[error("can`t update notes")]
    NoteUpdate,
    #[error("{0}")]
    Validation(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::EmptyResult => StatusCode::OK,
            AppError::NoteCreate | AppError::NoteUpdate => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the response body. Internal details stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) | AppError::Database(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        Envelope::<()>::failure(status, self.public_message()).into_response()
    }
}

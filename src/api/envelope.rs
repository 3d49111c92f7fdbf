//! Response envelope shared by every `/v1` and `/_internal` endpoint:
//! `{"payload": ..., "status_code": ..., "exception": {...}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
pub struct Exception {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub payload: Option<T>,
    pub status_code: u16,
    pub exception: Exception,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(status: StatusCode, payload: T) -> Self {
        Envelope {
            payload: Some(payload),
            status_code: status.as_u16(),
            exception: Exception::default(),
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Envelope {
            payload: None,
            status_code: status.as_u16(),
            exception: Exception {
                message: Some(message.into()),
            },
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Successful handler result: a payload plus the status to send it with.
pub struct Reply<T> {
    status: StatusCode,
    payload: T,
}

impl<T> Reply<T> {
    pub fn ok(payload: T) -> Self {
        Reply {
            status: StatusCode::OK,
            payload,
        }
    }

    pub fn created(payload: T) -> Self {
        Reply {
            status: StatusCode::CREATED,
            payload,
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        Envelope::success(self.status, self.payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let body = serde_json::to_value(Envelope::success(StatusCode::CREATED, json!({"a": 1})))
            .unwrap();
        assert_eq!(
            body,
            json!({"payload": {"a": 1}, "status_code": 201, "exception": {}})
        );
    }

    #[test]
    fn test_failure_shape() {
        let body =
            serde_json::to_value(Envelope::<()>::failure(StatusCode::OK, "empty result.")).unwrap();
        assert_eq!(
            body,
            json!({"payload": null, "status_code": 200, "exception": {"message": "empty result."}})
        );
    }
}

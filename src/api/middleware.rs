use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::{info_span, Instrument};

use crate::context::{self, TxId};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Bind a fresh [`TxId`] for the request, log everything below it in a span
/// carrying the id, and echo the id back in `x-request-id`.
pub async fn request_context(request: Request, next: Next) -> Response {
    let tx_id = TxId::generate();
    let span = info_span!(
        "request",
        request_id = %tx_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = context::scope(tx_id.clone(), next.run(request))
        .instrument(span)
        .await;

    if let Ok(value) = HeaderValue::from_str(tx_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

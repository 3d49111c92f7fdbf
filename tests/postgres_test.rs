//! End-to-end checks against a live PostgreSQL.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

use axum::http::StatusCode;
use heart::api::{self, AppState};
use heart::db::{run_migrations, Driver, PgBackend};
use heart::Repository;
use serde_json::{json, Value};
use sqlx::postgres::PgPool;
use std::sync::Arc;
use tower::util::ServiceExt;

async fn setup_test_app() -> axum::Router {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("connect failed");
    run_migrations(&pool).await.expect("migrations failed");

    let driver = Driver::new(Arc::new(PgBackend::new(pool)));
    let repo = Arc::new(Repository::new(Arc::new(driver)));
    api::create_router(AppState::new(repo, None))
}

async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_note_create_and_duplicate() {
    let app = setup_test_app().await;
    let name = unique("note");

    let (status, body) = request(&app, "POST", "/v1/notes/", Some(json!({"name": name, "content": "c"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["payload"]["name"], name.as_str());

    let (status, body) = request(&app, "POST", "/v1/notes/", Some(json!({"name": name, "content": "c"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["exception"]["message"], "can`t create notes");

    let (status, body) = request(&app, "DELETE", &format!("/v1/notes/?name={name}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["deleted"], true);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_transaction_exception_leaves_no_row() {
    let app = setup_test_app().await;
    let name = unique("record");

    let (status, _) = request(
        &app,
        "POST",
        "/_internal/v1/postgres/transaction_exception/",
        Some(json!({"name": name, "value": "v"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, body) = request(
        &app,
        "GET",
        &format!("/_internal/v1/postgres/simple/?name={name}"),
        None,
    )
    .await;
    assert_eq!(body["payload"], json!([]));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_ready_pings_database() {
    let app = setup_test_app().await;
    let (status, body) = request(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

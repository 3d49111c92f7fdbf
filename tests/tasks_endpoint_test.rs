use axum::http::StatusCode;
use heart::api::{self, AppState};
use heart::db::{Driver, MemoryBackend};
use heart::Repository;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn setup_test_app() -> axum::Router {
    let driver = Driver::new(Arc::new(MemoryBackend::new()));
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

#[tokio::test]
async fn test_task_lifecycle() {
    let app = setup_test_app();

    let (status, body) = request(
        &app,
        "POST",
        "/v1/tasks/",
        Some(json!({"name": "ship", "content": "ship it"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["payload"]["complete"], false);
    assert_eq!(body["payload"]["deleted"], false);
    assert!(body["payload"].get("id").is_none());

    let (status, body) = request(
        &app,
        "PATCH",
        "/v1/tasks",
        Some(json!({"name": "ship", "complete": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["complete"], true);
    assert_eq!(body["payload"]["content"], "ship it");

    let (status, body) = request(&app, "DELETE", "/v1/tasks/?name=ship", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["deleted"], true);
    assert_eq!(body["payload"]["complete"], true);

    let (_, body) = request(&app, "GET", "/v1/tasks/", None).await;
    let payload = body["payload"].as_array().unwrap();
    assert_eq!(payload.len(), 1);
    assert_eq!(payload[0]["deleted"], true);
}

#[tokio::test]
async fn test_update_content_keeps_complete() {
    let app = setup_test_app();
    request(&app, "POST", "/v1/tasks/", Some(json!({"name": "t"}))).await;
    request(
        &app,
        "PATCH",
        "/v1/tasks/",
        Some(json!({"name": "t", "complete": true})),
    )
    .await;

    let (_, body) = request(
        &app,
        "PATCH",
        "/v1/tasks/",
        Some(json!({"name": "t", "content": "notes"})),
    )
    .await;
    assert_eq!(body["payload"]["complete"], true);
    assert_eq!(body["payload"]["content"], "notes");
}

#[tokio::test]
async fn test_duplicate_task_is_internal_error() {
    let app = setup_test_app();
    request(&app, "POST", "/v1/tasks/", Some(json!({"name": "t"}))).await;

    let (status, body) = request(&app, "POST", "/v1/tasks/", Some(json!({"name": "t"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status_code"], 500);
    assert_eq!(body["payload"], Value::Null);
    assert_eq!(body["exception"]["message"], "internal server error");
}

#[tokio::test]
async fn test_missing_task_is_empty_result() {
    let app = setup_test_app();

    let (status, body) = request(
        &app,
        "PATCH",
        "/v1/tasks/",
        Some(json!({"name": "ghost", "complete": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exception"]["message"], "empty result.");

    let (status, body) = request(&app, "DELETE", "/v1/tasks/?name=ghost", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exception"]["message"], "empty result.");
}

#[tokio::test]
async fn test_wrong_type_for_complete_is_422() {
    let app = setup_test_app();
    let (status, body) = request(
        &app,
        "PATCH",
        "/v1/tasks/",
        Some(json!({"name": "t", "complete": "sometimes"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status_code"], 422);
}

use axum::http::StatusCode;
use futures::future::join_all;
use heart::api::{self, AppState};
use heart::db::{Driver, MemoryBackend};
use heart::Repository;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

const SIMPLE: &str = "/_internal/v1/postgres/simple/";
const TRANSACTION: &str = "/_internal/v1/postgres/transaction/";
const TRANSACTION_EXCEPTION: &str = "/_internal/v1/postgres/transaction_exception/";

struct TestApp {
    app: axum::Router,
    driver: Arc<Driver>,
}

fn setup_test_app() -> TestApp {
    let driver = Arc::new(Driver::new(Arc::new(MemoryBackend::new())));
    let repo = Arc::new(Repository::new(Arc::clone(&driver)));
    TestApp {
        app: api::create_router(AppState::new(repo, None)),
        driver,
    }
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

async fn stored(app: &axum::Router) -> Vec<(String, String)> {
    let (status, body) = request(app, "GET", SIMPLE, None).await;
    assert_eq!(status, StatusCode::OK);
    body["payload"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["name"].as_str().unwrap().to_string(),
                r["value"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_simple_crud() {
    let TestApp { app, .. } = setup_test_app();

    let (status, body) = request(&app, "POST", SIMPLE, Some(json!({"name": "k", "value": "v"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["payload"], json!({"id": 1, "name": "k", "value": "v"}));

    let (status, body) = request(
        &app,
        "PATCH",
        "/_internal/v1/postgres/simple",
        Some(json!({"name": "k", "value": "v2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["value"], "v2");

    let (_, body) = request(&app, "GET", &format!("{SIMPLE}?name=k&limit=1"), None).await;
    assert_eq!(body["payload"].as_array().unwrap().len(), 1);

    let (status, body) = request(&app, "DELETE", &format!("{SIMPLE}?name=k"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["name"], "k");
    assert!(stored(&app).await.is_empty());
}

#[tokio::test]
async fn test_simple_missing_rows_are_empty_result() {
    let TestApp { app, .. } = setup_test_app();

    let (status, body) = request(&app, "PATCH", SIMPLE, Some(json!({"name": "x", "value": "y"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exception"]["message"], "empty result.");

    let (status, body) = request(&app, "DELETE", &format!("{SIMPLE}?name=x"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exception"]["message"], "empty result.");
}

#[tokio::test]
async fn test_transaction_endpoints_commit() {
    let TestApp { app, driver } = setup_test_app();

    let (status, _) = request(&app, "POST", TRANSACTION, Some(json!({"name": "k", "value": "v"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(stored(&app).await, vec![("k".to_string(), "v".to_string())]);

    let (status, body) = request(&app, "PATCH", TRANSACTION, Some(json!({"name": "k", "value": "v2"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["value"], "v2");

    let (status, _) = request(&app, "DELETE", &format!("{TRANSACTION}?name=k"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(stored(&app).await.is_empty());
    assert_eq!(driver.open_transactions(), 0);
}

#[tokio::test]
async fn test_transaction_exception_rolls_back_create() {
    let TestApp { app, driver } = setup_test_app();

    let (status, body) = request(
        &app,
        "POST",
        TRANSACTION_EXCEPTION,
        Some(json!({"name": "k", "value": "v"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status_code"], 500);
    assert_eq!(body["payload"], Value::Null);
    assert_eq!(body["exception"]["message"], "internal server error");
    assert!(stored(&app).await.is_empty());
    assert_eq!(driver.open_transactions(), 0);
}

#[tokio::test]
async fn test_transaction_exception_rolls_back_update_and_delete() {
    let TestApp { app, .. } = setup_test_app();
    request(&app, "POST", SIMPLE, Some(json!({"name": "k", "value": "v"}))).await;

    let (status, _) = request(
        &app,
        "PATCH",
        TRANSACTION_EXCEPTION,
        Some(json!({"name": "k", "value": "changed"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = request(&app, "DELETE", &format!("{TRANSACTION_EXCEPTION}?name=k"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(stored(&app).await, vec![("k".to_string(), "v".to_string())]);
}

#[tokio::test]
async fn test_transaction_exception_has_no_get() {
    let TestApp { app, .. } = setup_test_app();
    let req = axum::http::Request::builder()
        .method("GET")
        .uri(TRANSACTION_EXCEPTION)
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_concurrent_requests_use_separate_transactions() {
    let TestApp { app, driver } = setup_test_app();

    let requests = (0..8).map(|i| {
        let path = if i % 2 == 0 { TRANSACTION } else { TRANSACTION_EXCEPTION };
        let app = &app;
        async move {
            request(
                app,
                "POST",
                path,
                Some(json!({"name": format!("k{i}"), "value": "v"})),
            )
            .await
            .0
        }
    });
    let statuses = join_all(requests).await;
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::CREATED)
            .count(),
        4
    );

    let mut names: Vec<_> = stored(&app).await.into_iter().map(|(n, _)| n).collect();
    names.sort();
    assert_eq!(names, vec!["k0", "k2", "k4", "k6"]);
    assert_eq!(driver.open_transactions(), 0);
}

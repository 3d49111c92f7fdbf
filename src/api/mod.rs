pub mod envelope;
pub mod extractors;
pub mod health;
pub mod internal;
pub mod middleware;
pub mod notes;
pub mod tasks;

use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{get, post, MethodRouter},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cache::RedisDriver;
use crate::db::Repository;
use crate::domain::{ListFilter, Page, ValidationError};
use crate::usecase::{InternalUsecase, NotesUsecase, TasksUsecase};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub notes: NotesUsecase,
    pub tasks: TasksUsecase,
    pub internal: InternalUsecase,
    pub redis: Option<RedisDriver>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, redis: Option<RedisDriver>) -> Self {
        Self {
            notes: NotesUsecase::new(Arc::clone(&repo)),
            tasks: TasksUsecase::new(Arc::clone(&repo)),
            internal: InternalUsecase::new(Arc::clone(&repo)),
            repo,
            redis,
        }
    }
}

/// `GET` query shared by notes and tasks.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub date_create: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    pub fn into_filter(self) -> Result<ListFilter, ValidationError> {
        Ok(ListFilter {
            page: Page::new(self.limit, self.offset)?,
            name: self.name,
            date_create: self.date_create,
        })
    }
}

/// `DELETE ?name=` query.
#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

/// Register `methods` under `path` both with and without a trailing slash.
fn route_both(
    router: Router<AppState>,
    path: &str,
    methods: MethodRouter<AppState>,
) -> Router<AppState> {
    router
        .route(path, methods.clone())
        .route(&format!("{path}/"), methods)
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready));

    let router = route_both(
        router,
        "/v1/notes",
        get(notes::list_notes)
            .post(notes::create_note)
            .patch(notes::update_note)
            .delete(notes::delete_note),
    );
    let router = route_both(
        router,
        "/v1/tasks",
        get(tasks::list_tasks)
            .post(tasks::create_task)
            .patch(tasks::update_task)
            .delete(tasks::delete_task),
    );
    let router = route_both(
        router,
        "/_internal/v1/postgres/simple",
        get(internal::list_records)
            .post(internal::create_record)
            .patch(internal::update_record)
            .delete(internal::delete_record),
    );
    let router = route_both(
        router,
        "/_internal/v1/postgres/transaction",
        post(internal::create_record_tx)
            .patch(internal::update_record_tx)
            .delete(internal::delete_record_tx),
    );
    let router = route_both(
        router,
        "/_internal/v1/postgres/transaction_exception",
        post(internal::create_record_tx_failing)
            .patch(internal::update_record_tx_failing)
            .delete(internal::delete_record_tx_failing),
    );

    router
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(middleware::request_context))
        .layer(cors)
        .with_state(state)
}

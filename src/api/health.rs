use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::warn;

use super::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Ready once PostgreSQL (and Redis, when configured) answer a ping.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if let Err(err) = state.repo.ping().await {
        warn!(error = %err, "postgres not ready");
        return unavailable();
    }
    if let Some(redis) = &state.redis {
        if let Err(err) = redis.ping().await {
            warn!(error = %err, "redis not ready");
            return unavailable();
        }
    }
    (StatusCode::OK, Json(json!({"status": "ready"})))
}

fn unavailable() -> (StatusCode, Json<Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"status": "unavailable"})),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_returns_ok() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_ready_with_memory_backend() {
        let state = AppState::new(crate::usecase::memory_repo(), None);
        let (status, Json(body)) = ready(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }
}

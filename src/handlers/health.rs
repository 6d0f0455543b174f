//! Liveness and readiness probes

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::warn;
use crate::database::health_check;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(live))
        .route("/health/ready", get(ready))
}

/// GET /health
async fn live() -> Json<Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

/// GET /health/ready - also checks the database
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match health_check(state.db.pool()).await {
        Ok(latency) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "database_ms": latency.as_millis() as u64 })),
        ),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "unavailable" })))
        }
    }
}

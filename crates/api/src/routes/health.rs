//! Liveness endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    checks: BTreeMap<&'static str, bool>,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db = Arc::clone(&state.db);
    let database_ready = tokio::task::spawn_blocking(move || db.health_check().is_ok())
        .await
        .unwrap_or(false);

    let mut checks = BTreeMap::new();
    checks.insert("database", database_ready);

    let all_ready = checks.values().all(|ok| *ok);
    let status = if all_ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status,
        Json(HealthResponse { status: if all_ready { "ok" } else { "degraded" }, checks }),
    )
}

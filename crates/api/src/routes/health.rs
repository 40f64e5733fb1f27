use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Liveness report for load balancers and operators.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok` when every dependency answered, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub database: bool,
    /// Whether the attachment directory exists and is a directory.
    pub attachment_store: bool,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let database = sanjesh_db::health_check(&state.pool).await.is_ok();
    let attachment_store = tokio::fs::metadata(&state.config.attachment_dir)
        .await
        .is_ok_and(|m| m.is_dir());

    if !database || !attachment_store {
        tracing::warn!(database, attachment_store, "Health check degraded");
    }

    Json(HealthReport {
        status: if database && attachment_store { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        attachment_store,
    })
}

/// Root-level routes, mounted outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

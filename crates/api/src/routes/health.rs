use axum::extract::State;
use axum::{routing::get, Json, Router};
use gather_reminders::SchedulerState;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the background reminder scheduler is running.
    pub reminder_scheduler: SchedulerState,
}

/// GET /health -- returns service, database and scheduler health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = gather_db::health_check(&state.pool).await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        reminder_scheduler: state.scheduler.state(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

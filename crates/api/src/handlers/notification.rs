//! Handlers for the `/notifications` resource.
//!
//! All endpoints require a caller identity via [`AuthUser`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gather_core::error::CoreError;
use gather_core::types::DbId;
use gather_db::models::notification::Notification;
use gather_reminders::PassReport;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/notifications
///
/// List the caller's notifications, newest first.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let notifications = state.store.list_for_user(auth.user_id).await?;

    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// POST /api/v1/notifications/{id}/read
///
/// Mark one of the caller's notifications as read. Returns 204 No Content,
/// or 403 if the notification does not exist or belongs to someone else.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let owned = state
        .store
        .list_for_user(auth.user_id)
        .await?
        .iter()
        .any(|n| n.id == notification_id);

    if !owned {
        return Err(AppError::Core(CoreError::Forbidden(
            "Notification not found or access denied".into(),
        )));
    }

    state.store.mark_read(notification_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/trigger
///
/// Run one reminder pass now and return its report. Always 200: a failed
/// eligibility query shows up as `query_error` in the body.
pub async fn trigger_reminders(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Json<DataResponse<PassReport>> {
    tracing::info!(user_id = auth.user_id, "Reminder pass requested via API");

    let report = state.scheduler.process_manually().await;

    Json(DataResponse { data: report })
}

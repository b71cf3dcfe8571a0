//! Route definitions for the `/notifications` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /                          -> list_notifications
/// POST   /{id}/read                 -> mark_read
/// POST   /trigger                   -> trigger_reminders
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_notifications))
        .route("/{id}/read", post(notification::mark_read))
        .route("/trigger", post(notification::trigger_reminders))
}

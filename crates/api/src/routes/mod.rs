pub mod health;
pub mod notification;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /notifications                                   list (caller's own)
/// /notifications/{id}/read                         mark read (POST)
/// /notifications/trigger                           run a reminder pass now (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/notifications", notification::router())
}

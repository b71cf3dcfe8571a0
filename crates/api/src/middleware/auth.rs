//! Caller identity extractor for Axum handlers.
//!
//! Authentication happens upstream: the gateway in front of this service
//! verifies the session and forwards the user id in [`USER_ID_HEADER`].
//! This extractor only reads and parses that header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gather_core::error::CoreError;
use gather_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf the request is made.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Missing {USER_ID_HEADER} header"
                )))
            })?;

        let user_id = raw
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<DbId>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid {USER_ID_HEADER} header")))?;

        Ok(AuthUser { user_id })
    }
}

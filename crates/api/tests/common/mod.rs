#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use gather_api::config::ServerConfig;
use gather_api::router::build_app_router;
use gather_api::state::AppState;
use gather_reminders::{NotificationStore, PgNotificationStore, ReminderScheduler, SchedulerConfig};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: String::new(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router over `pool`.
///
/// The reminder scheduler is constructed but not started, so passes only
/// run when a test triggers one.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let scheduler_config = SchedulerConfig::default();
    let store: Arc<dyn NotificationStore> =
        Arc::new(PgNotificationStore::new(pool.clone(), scheduler_config.window));
    let scheduler = Arc::new(ReminderScheduler::new(Arc::clone(&store), scheduler_config));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        store,
        scheduler,
    };

    build_app_router(state, &config)
}

/// Send a request with an optional caller id and return the response.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    user_id: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user_id {
        builder = builder.header("x-user-id", id);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Anonymous GET.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

/// GET as the given user.
pub async fn get_as(app: Router, uri: &str, user_id: i64) -> Response<Body> {
    send(app, Method::GET, uri, Some(&user_id.to_string())).await
}

/// POST with an empty body as the given user.
pub async fn post_as(app: Router, uri: &str, user_id: i64) -> Response<Body> {
    send(app, Method::POST, uri, Some(&user_id.to_string())).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

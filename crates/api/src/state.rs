use std::sync::Arc;

use gather_reminders::{NotificationStore, ReminderScheduler};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything non-`Clone` sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (health checks).
    pub pool: gather_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Notification storage shared with the reminder scheduler.
    pub store: Arc<dyn NotificationStore>,
    /// Background reminder scheduler; also serves manual triggers.
    pub scheduler: Arc<ReminderScheduler>,
}

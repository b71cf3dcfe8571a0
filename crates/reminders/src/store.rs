//! Data-access seam for the reminder engine.
//!
//! The scheduler and the HTTP layer talk to notifications only through
//! [`NotificationStore`], so tests can substitute an in-memory double and
//! production wires in [`PgNotificationStore`].

use async_trait::async_trait;
use gather_core::types::{DbId, Timestamp};
use gather_db::models::notification::{CreateNotification, Notification, UpcomingReminder};
use gather_db::repositories::NotificationRepo;
use gather_db::DbPool;

/// Errors surfaced by a [`NotificationStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connectivity, query or row-decoding failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Inserting a notification failed. The source carries the specific
    /// reason (statement failure, constraint violation, or no id returned).
    #[error("Failed to save notification: {0}")]
    SaveFailed(#[source] sqlx::Error),
}

/// Storage operations needed by reminder passes and notification listing.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Pairs due for an `upcoming_event` reminder at `now`.
    ///
    /// An empty vector is a normal outcome, not an error.
    async fn upcoming_reminders(
        &self,
        now: Timestamp,
    ) -> Result<Vec<UpcomingReminder>, StoreError>;

    /// Persist a notification and return it with its generated id.
    async fn save(&self, notification: &CreateNotification) -> Result<Notification, StoreError>;

    /// All notifications for `user_id`, newest first.
    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<Notification>, StoreError>;

    /// Flip the read flag. Idempotent; unknown ids are not an error.
    async fn mark_read(&self, notification_id: DbId) -> Result<(), StoreError>;
}

/// [`NotificationStore`] backed by the PostgreSQL repositories.
#[derive(Clone)]
pub struct PgNotificationStore {
    pool: DbPool,
    window: chrono::Duration,
}

impl PgNotificationStore {
    /// Create a store over `pool` that looks `window` ahead for events.
    pub fn new(pool: DbPool, window: chrono::Duration) -> Self {
        Self { pool, window }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn upcoming_reminders(
        &self,
        now: Timestamp,
    ) -> Result<Vec<UpcomingReminder>, StoreError> {
        Ok(NotificationRepo::find_upcoming_reminders(&self.pool, now, self.window).await?)
    }

    async fn save(&self, notification: &CreateNotification) -> Result<Notification, StoreError> {
        NotificationRepo::create(&self.pool, notification)
            .await
            .map_err(StoreError::SaveFailed)
    }

    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<Notification>, StoreError> {
        Ok(NotificationRepo::list_for_user(&self.pool, user_id).await?)
    }

    async fn mark_read(&self, notification_id: DbId) -> Result<(), StoreError> {
        Ok(NotificationRepo::mark_read(&self.pool, notification_id).await?)
    }
}

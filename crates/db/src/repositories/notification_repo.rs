//! Repository for the `notifications` table.

use chrono::Duration;
use gather_core::notification_types::NOTIFICATION_TYPE_UPCOMING_EVENT;
use gather_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::notification::{CreateNotification, Notification, UpcomingReminder};

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, event_id, message, notification_type, is_read, created_at";

/// Provides persistence for notifications and the reminder eligibility query.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification, returning the stored row with its generated id.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (user_id, event_id, message, notification_type, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.user_id)
            .bind(input.event_id)
            .bind(&input.message)
            .bind(&input.notification_type)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// List every notification for a user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Mark a notification as read.
    ///
    /// Re-marking a read notification, or marking an id that does not exist,
    /// succeeds without changes. Ownership is the caller's concern.
    pub async fn mark_read(pool: &PgPool, notification_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1")
            .bind(notification_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Find (event, registered user) pairs that should get an
    /// `upcoming_event` reminder at `now`.
    ///
    /// A pair qualifies when the event starts within `[now, now + window]`
    /// (both ends inclusive) and the user has no `upcoming_event`
    /// notification for that event created on the same UTC calendar day as
    /// `now`. Rows come back in no particular order.
    pub async fn find_upcoming_reminders(
        pool: &PgPool,
        now: Timestamp,
        window: Duration,
    ) -> Result<Vec<UpcomingReminder>, sqlx::Error> {
        sqlx::query_as::<_, UpcomingReminder>(
            "SELECT e.id AS event_id, e.name AS event_name, e.starts_at, r.user_id \
             FROM events e \
             JOIN registrations r ON r.event_id = e.id \
             WHERE e.starts_at BETWEEN $1 AND $2 \
             AND NOT EXISTS ( \
                 SELECT 1 FROM notifications n \
                 WHERE n.event_id = e.id \
                 AND n.user_id = r.user_id \
                 AND n.notification_type = $3 \
                 AND (n.created_at AT TIME ZONE 'UTC')::date = ($1 AT TIME ZONE 'UTC')::date \
             )",
        )
        .bind(now)
        .bind(now + window)
        .bind(NOTIFICATION_TYPE_UPCOMING_EVENT)
        .fetch_all(pool)
        .await
    }
}

//! Notification entity models and DTOs.

use gather_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    pub message: String,
    pub notification_type: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// DTO for inserting a notification.
///
/// `created_at` is supplied by the caller so that a reminder pass stamps
/// every row with the same instant it used for the eligibility check.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub event_id: DbId,
    pub message: String,
    pub notification_type: String,
    pub created_at: Timestamp,
}

/// An (event, registered user) pair due for an `upcoming_event` reminder.
///
/// Produced by
/// [`NotificationRepo::find_upcoming_reminders`](crate::repositories::NotificationRepo::find_upcoming_reminders).
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UpcomingReminder {
    pub event_id: DbId,
    pub event_name: String,
    pub starts_at: Timestamp,
    pub user_id: DbId,
}

//! Well-known notification type tags.
//!
//! These must match the values stored in the `notifications.notification_type`
//! column and referenced by the eligibility query and the reminder scheduler.

/// Reminder that an event the user registered for starts within the
/// reminder window.
pub const NOTIFICATION_TYPE_UPCOMING_EVENT: &str = "upcoming_event";

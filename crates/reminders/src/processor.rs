//! A single reminder pass.
//!
//! [`ReminderProcessor::run_pass`] asks the store which (event, user) pairs
//! are due, composes a message for each and saves one `upcoming_event`
//! notification per pair. A failed save is logged and skipped; a failed
//! eligibility query ends the pass with nothing written.

use std::sync::Arc;

use chrono::Utc;
use gather_core::notification_types::NOTIFICATION_TYPE_UPCOMING_EVENT;
use gather_core::reminder::compose_reminder;
use gather_core::types::Timestamp;
use gather_db::models::notification::CreateNotification;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::store::NotificationStore;

// ---------------------------------------------------------------------------
// PassReport
// ---------------------------------------------------------------------------

/// Outcome of one reminder pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Pairs returned by the eligibility query.
    pub eligible: usize,
    /// Notifications saved.
    pub created: usize,
    /// Saves that failed and were skipped.
    pub failed: usize,
    /// Set when the eligibility query itself failed.
    pub query_error: Option<String>,
}

impl PassReport {
    /// `true` when the query succeeded and every save went through.
    pub fn is_clean(&self) -> bool {
        self.query_error.is_none() && self.failed == 0
    }
}

// ---------------------------------------------------------------------------
// ReminderProcessor
// ---------------------------------------------------------------------------

/// Runs reminder passes against a [`NotificationStore`].
///
/// Passes started on the same processor run one at a time, so a manual
/// trigger that lands during a scheduled pass waits for it instead of
/// racing it. Separate processes sharing a database are not coordinated.
pub struct ReminderProcessor {
    store: Arc<dyn NotificationStore>,
    pass_lock: Mutex<()>,
}

impl ReminderProcessor {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self {
            store,
            pass_lock: Mutex::new(()),
        }
    }

    /// Run one pass at the current time.
    pub async fn run_pass(&self) -> PassReport {
        self.run_pass_at(Utc::now()).await
    }

    /// Run one pass as if the current time were `now`.
    pub async fn run_pass_at(&self, now: Timestamp) -> PassReport {
        let _guard = self.pass_lock.lock().await;

        tracing::debug!(%now, "Processing upcoming events for reminders");

        let due = match self.store.upcoming_reminders(now).await {
            Ok(due) => due,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch upcoming events for reminders");
                return PassReport {
                    query_error: Some(e.to_string()),
                    ..PassReport::default()
                };
            }
        };

        if due.is_empty() {
            tracing::info!("No upcoming events need reminders");
            return PassReport::default();
        }

        let mut report = PassReport {
            eligible: due.len(),
            ..PassReport::default()
        };

        for reminder in &due {
            let notification = CreateNotification {
                user_id: reminder.user_id,
                event_id: reminder.event_id,
                message: compose_reminder(&reminder.event_name, reminder.starts_at, now),
                notification_type: NOTIFICATION_TYPE_UPCOMING_EVENT.to_string(),
                created_at: now,
            };

            match self.store.save(&notification).await {
                Ok(saved) => {
                    report.created += 1;
                    tracing::debug!(
                        notification_id = saved.id,
                        user_id = reminder.user_id,
                        event_id = reminder.event_id,
                        "Created reminder"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        user_id = reminder.user_id,
                        event_id = reminder.event_id,
                        error = %e,
                        "Failed to create reminder"
                    );
                }
            }
        }

        if report.is_clean() {
            tracing::info!(
                eligible = report.eligible,
                created = report.created,
                "Reminder pass complete"
            );
        } else {
            tracing::warn!(
                eligible = report.eligible,
                created = report.created,
                failed = report.failed,
                "Reminder pass complete with failed saves"
            );
        }

        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

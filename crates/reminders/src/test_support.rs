//! In-memory [`NotificationStore`] double for processor and scheduler tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use gather_core::notification_types::NOTIFICATION_TYPE_UPCOMING_EVENT;
use gather_core::types::{DbId, Timestamp};
use gather_db::models::notification::{CreateNotification, Notification, UpcomingReminder};

use crate::store::{NotificationStore, StoreError};

#[derive(Default)]
struct Inner {
    events: Vec<(DbId, String, Timestamp)>,
    registrations: Vec<(DbId, DbId)>,
    notifications: Vec<Notification>,
    failing_users: HashSet<DbId>,
    fail_query: bool,
    hang_query: bool,
    save_delay: Option<Duration>,
    query_calls: usize,
    save_calls: usize,
}

/// Mirrors the eligibility rules of the SQL query over plain vectors, with
/// switches for injecting failures.
#[derive(Default)]
pub(crate) struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub(crate) fn add_event(&self, event_id: DbId, name: &str, starts_at: Timestamp) {
        self.lock().events.push((event_id, name.to_string(), starts_at));
    }

    pub(crate) fn register(&self, event_id: DbId, user_id: DbId) {
        self.lock().registrations.push((event_id, user_id));
    }

    pub(crate) fn fail_saves_for(&self, user_id: DbId) {
        self.lock().failing_users.insert(user_id);
    }

    pub(crate) fn fail_query(&self) {
        self.lock().fail_query = true;
    }

    /// Make the eligibility query never complete.
    pub(crate) fn hang_query(&self) {
        self.lock().hang_query = true;
    }

    /// Make every save take `delay` before it lands.
    pub(crate) fn slow_saves(&self, delay: Duration) {
        self.lock().save_delay = Some(delay);
    }

    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    pub(crate) fn query_calls(&self) -> usize {
        self.lock().query_calls
    }

    pub(crate) fn save_calls(&self) -> usize {
        self.lock().save_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn upcoming_reminders(
        &self,
        now: Timestamp,
    ) -> Result<Vec<UpcomingReminder>, StoreError> {
        let hang = {
            let mut inner = self.lock();
            inner.query_calls += 1;
            if inner.fail_query {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            inner.hang_query
        };
        if hang {
            std::future::pending::<()>().await;
        }

        // Let a concurrent pass interleave between the read and the writes.
        tokio::task::yield_now().await;

        let inner = self.lock();
        let window_end = now + chrono::Duration::hours(24);
        let today = now.date_naive();

        let due = inner
            .events
            .iter()
            .filter(|(_, _, starts_at)| *starts_at >= now && *starts_at <= window_end)
            .flat_map(|(event_id, name, starts_at)| {
                inner
                    .registrations
                    .iter()
                    .filter(move |(reg_event, _)| reg_event == event_id)
                    .map(move |(_, user_id)| UpcomingReminder {
                        event_id: *event_id,
                        event_name: name.clone(),
                        starts_at: *starts_at,
                        user_id: *user_id,
                    })
            })
            .filter(|candidate| {
                !inner.notifications.iter().any(|n| {
                    n.event_id == candidate.event_id
                        && n.user_id == candidate.user_id
                        && n.notification_type == NOTIFICATION_TYPE_UPCOMING_EVENT
                        && n.created_at.date_naive() == today
                })
            })
            .collect();

        Ok(due)
    }

    async fn save(&self, notification: &CreateNotification) -> Result<Notification, StoreError> {
        let delay = self.lock().save_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.lock();
        inner.save_calls += 1;
        if inner.failing_users.contains(&notification.user_id) {
            return Err(StoreError::SaveFailed(sqlx::Error::RowNotFound));
        }

        let saved = Notification {
            id: inner.notifications.len() as DbId + 1,
            user_id: notification.user_id,
            event_id: notification.event_id,
            message: notification.message.clone(),
            notification_type: notification.notification_type.clone(),
            is_read: false,
            created_at: notification.created_at,
        };
        inner.notifications.push(saved.clone());
        Ok(saved)
    }

    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<Notification>, StoreError> {
        let mut listed: Vec<Notification> = self
            .lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(listed)
    }

    async fn mark_read(&self, notification_id: DbId) -> Result<(), StoreError> {
        if let Some(n) = self
            .lock()
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
        {
            n.is_read = true;
        }
        Ok(())
    }
}

//! Background reminder scheduler.
//!
//! [`ReminderScheduler`] owns one background task while running. The task
//! runs a pass immediately, then one pass per configured interval until it
//! is cancelled. Cancellation is only observed between passes; a pass in
//! flight always finishes unless `stop()` gives up waiting and aborts it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::processor::{PassReport, ReminderProcessor};
use crate::store::NotificationStore;

/// Lifecycle state of a [`ReminderScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Stopped,
    Running,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Reminder scheduler is already running")]
    AlreadyRunning,

    #[error("Reminder scheduler did not stop within {0:?}; background task aborted")]
    StopTimedOut(Duration),
}

/// Handles for the live background task.
struct RunningTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Runs reminder passes on a fixed interval and on demand.
pub struct ReminderScheduler {
    processor: Arc<ReminderProcessor>,
    config: SchedulerConfig,
    task: Mutex<Option<RunningTask>>,
}

impl ReminderScheduler {
    pub fn new(store: Arc<dyn NotificationStore>, config: SchedulerConfig) -> Self {
        Self {
            processor: Arc::new(ReminderProcessor::new(store)),
            config,
            task: Mutex::new(None),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        if self.slot().is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    /// Spawn the background task. Must be called inside a Tokio runtime.
    ///
    /// The first pass runs right away on the background task; later passes
    /// follow every `config.interval`.
    pub fn start(&self) -> Result<(), SchedulerError> {
        let mut slot = self.slot();
        if slot.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            Arc::clone(&self.processor),
            self.config.interval,
            cancel.clone(),
        ));
        *slot = Some(RunningTask { cancel, handle });

        Ok(())
    }

    /// Signal the background task to stop and wait for it to finish.
    ///
    /// Waits at most `config.stop_timeout`, which bounds how long a pass
    /// that is still running can delay shutdown. On timeout the task is
    /// aborted and [`SchedulerError::StopTimedOut`] is returned. The
    /// scheduler is [`SchedulerState::Stopped`] afterwards in every case.
    /// Stopping a scheduler that is not running does nothing.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let Some(RunningTask { cancel, mut handle }) = self.slot().take() else {
            return Ok(());
        };

        cancel.cancel();

        match tokio::time::timeout(self.config.stop_timeout, &mut handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Reminder scheduler task ended abnormally");
                Ok(())
            }
            Err(_) => {
                handle.abort();
                tracing::warn!(
                    timeout_secs = self.config.stop_timeout.as_secs(),
                    "Reminder scheduler did not stop in time, aborted"
                );
                Err(SchedulerError::StopTimedOut(self.config.stop_timeout))
            }
        }
    }

    /// Run one pass now and wait for it.
    ///
    /// Never fails as a call; query and save failures are reported in the
    /// returned [`PassReport`]. Works whether or not the scheduler is
    /// running, and waits for any pass already in progress.
    ///
    /// The pass runs on its own task, so dropping the returned future (a
    /// request timeout, a client going away) does not cut it short.
    pub async fn process_manually(&self) -> PassReport {
        tracing::info!("Manual reminder pass triggered");

        let processor = Arc::clone(&self.processor);
        match tokio::spawn(async move { processor.run_pass().await }).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Manual reminder pass ended abnormally");
                PassReport {
                    query_error: Some(format!("Reminder pass ended abnormally: {e}")),
                    ..PassReport::default()
                }
            }
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<RunningTask>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.slot().take() {
            task.cancel.cancel();
        }
    }
}

/// Background loop: one pass immediately, then one per tick until cancelled.
async fn run(processor: Arc<ReminderProcessor>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Reminder scheduler started");

    processor.run_pass().await;

    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Reminder scheduler stopped");
                break;
            }
            _ = ticker.tick() => {
                processor.run_pass().await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::test_support::InMemoryStore;

    fn scheduler(store: &Arc<InMemoryStore>) -> ReminderScheduler {
        ReminderScheduler::new(
            Arc::clone(store) as Arc<dyn NotificationStore>,
            SchedulerConfig::default(),
        )
    }

    #[tokio::test]
    async fn starts_stopped() {
        let store = Arc::new(InMemoryStore::default());
        assert_eq!(scheduler(&store).state(), SchedulerState::Stopped);
    }

    #[tokio::test]
    async fn stop_right_after_start_finishes_the_first_pass() {
        let store = Arc::new(InMemoryStore::default());
        let scheduler = scheduler(&store);

        scheduler.start().unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Running);

        scheduler.stop().await.unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(store.query_calls(), 1);
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let store = Arc::new(InMemoryStore::default());
        let scheduler = scheduler(&store);

        scheduler.start().unwrap();
        assert_matches!(scheduler.start(), Err(SchedulerError::AlreadyRunning));

        scheduler.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_when_not_running_is_a_no_op() {
        let store = Arc::new(InMemoryStore::default());
        let scheduler = scheduler(&store);

        scheduler.stop().await.unwrap();
        scheduler.start().unwrap();
        scheduler.stop().await.unwrap();
        scheduler.stop().await.unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test]
    async fn can_restart_after_stop() {
        let store = Arc::new(InMemoryStore::default());
        let scheduler = scheduler(&store);

        scheduler.start().unwrap();
        scheduler.stop().await.unwrap();
        scheduler.start().unwrap();
        scheduler.stop().await.unwrap();

        assert_eq!(store.query_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn passes_repeat_every_interval() {
        let store = Arc::new(InMemoryStore::default());
        let scheduler = scheduler(&store);

        scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_secs(3600 * 2 + 1)).await;

        assert_eq!(store.query_calls(), 3);
        scheduler.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_gives_up_on_a_wedged_pass() {
        let store = Arc::new(InMemoryStore::default());
        store.hang_query();
        let scheduler = ReminderScheduler::new(
            Arc::clone(&store) as Arc<dyn NotificationStore>,
            SchedulerConfig {
                stop_timeout: Duration::from_secs(5),
                ..SchedulerConfig::default()
            },
        );

        scheduler.start().unwrap();
        tokio::task::yield_now().await;

        assert_matches!(
            scheduler.stop().await,
            Err(SchedulerError::StopTimedOut(timeout)) if timeout == Duration::from_secs(5)
        );
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test]
    async fn manual_pass_reports_query_failure() {
        let store = Arc::new(InMemoryStore::default());
        store.fail_query();

        let report = scheduler(&store).process_manually().await;

        assert!(report.query_error.is_some());
        assert_eq!(report.created, 0);
    }

    #[tokio::test]
    async fn manual_pass_creates_reminders() {
        let store = Arc::new(InMemoryStore::default());
        store.add_event(1, "Conference", chrono::Utc::now() + chrono::Duration::hours(12));
        store.register(1, 7);

        let report = scheduler(&store).process_manually().await;

        assert_eq!(report.created, 1);
        assert!(store.notifications()[0].message.contains("Conference"));
    }

    #[tokio::test(start_paused = true)]
    async fn manual_pass_finishes_after_caller_gives_up() {
        let store = Arc::new(InMemoryStore::default());
        store.add_event(1, "Conference", chrono::Utc::now() + chrono::Duration::hours(12));
        for user_id in 1..=5 {
            store.register(1, user_id);
        }
        store.slow_saves(Duration::from_secs(10));
        let scheduler = scheduler(&store);

        let outcome =
            tokio::time::timeout(Duration::from_secs(30), scheduler.process_manually()).await;
        assert!(outcome.is_err());

        tokio::time::sleep(Duration::from_secs(600)).await;

        assert_eq!(store.save_calls(), 5);
        assert_eq!(store.notifications().len(), 5);
    }

    #[tokio::test]
    async fn manual_pass_while_running_waits_its_turn() {
        let store = Arc::new(InMemoryStore::default());
        store.add_event(1, "Conference", chrono::Utc::now() + chrono::Duration::hours(12));
        store.register(1, 7);
        let scheduler = scheduler(&store);

        scheduler.start().unwrap();
        let report = scheduler.process_manually().await;
        scheduler.stop().await.unwrap();

        // Whichever pass ran first created the reminder; the other saw it.
        assert_eq!(store.notifications().len(), 1);
        assert!(report.is_clean());
    }
}

//! Scheduler configuration loaded from environment variables.

use std::time::Duration;

/// Default time between scheduled passes: 1 hour.
const DEFAULT_INTERVAL_SECS: u64 = 3600;

/// Default look-ahead for upcoming events: 24 hours.
const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Default time `stop()` waits for the background task to finish.
const DEFAULT_STOP_TIMEOUT_SECS: u64 = 30;

/// Reminder scheduler settings.
///
/// | Env Var                      | Default |
/// |------------------------------|---------|
/// | `REMINDER_INTERVAL_SECS`     | `3600`  |
/// | `REMINDER_WINDOW_HOURS`      | `24`    |
/// | `REMINDER_STOP_TIMEOUT_SECS` | `30`    |
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Period between scheduled passes.
    pub interval: Duration,
    /// How far ahead of `now` an event may start and still get a reminder.
    pub window: chrono::Duration,
    /// Upper bound on how long `stop()` waits before aborting the task.
    pub stop_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            window: chrono::Duration::hours(DEFAULT_WINDOW_HOURS),
            stop_timeout: Duration::from_secs(DEFAULT_STOP_TIMEOUT_SECS),
        }
    }
}

impl SchedulerConfig {
    /// Load configuration from the process environment.
    ///
    /// Missing, unparsable or zero values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let interval_secs = positive(&lookup, "REMINDER_INTERVAL_SECS", DEFAULT_INTERVAL_SECS);
        let window_hours = positive(&lookup, "REMINDER_WINDOW_HOURS", DEFAULT_WINDOW_HOURS);
        let stop_timeout_secs =
            positive(&lookup, "REMINDER_STOP_TIMEOUT_SECS", DEFAULT_STOP_TIMEOUT_SECS);

        Self {
            interval: Duration::from_secs(interval_secs),
            window: chrono::Duration::hours(window_hours),
            stop_timeout: Duration::from_secs(stop_timeout_secs),
        }
    }
}

/// Parse a strictly positive number from `key`, or return `default`.
fn positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default + Copy,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => value,
        _ => {
            tracing::warn!(key, value = %raw, "Invalid scheduler setting, using default");
            default
        }
    }
}

//! Upcoming-event reminder engine.
//!
//! - [`NotificationStore`] is the data-access seam; [`PgNotificationStore`]
//!   backs it with PostgreSQL.
//! - [`ReminderProcessor`] runs one pass: eligibility query, message
//!   composition, one saved notification per eligible pair.
//! - [`ReminderScheduler`] drives passes from a background task on a fixed
//!   interval and offers a manual trigger.

pub mod config;
pub mod processor;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod test_support;

pub use config::SchedulerConfig;
pub use processor::{PassReport, ReminderProcessor};
pub use scheduler::{ReminderScheduler, SchedulerError, SchedulerState};
pub use store::{NotificationStore, PgNotificationStore, StoreError};

//! Domain layer shared by every gather crate.
//!
//! Has no internal dependencies so the repository layer, the reminder
//! scheduler and the HTTP service can all use it.

pub mod error;
pub mod notification_types;
pub mod reminder;
pub mod types;

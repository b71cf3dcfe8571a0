//! Reminder message composition for upcoming events.
//!
//! Pure functions only; the scheduler decides *who* gets a reminder, this
//! module decides what it says. Phrasing is bucketed on the fractional
//! number of hours between `now` and the event start:
//!
//! | Hours until start | Phrasing                                   |
//! |-------------------|--------------------------------------------|
//! | `<= 1`            | "starting soon at 3:04 PM!"                |
//! | `(1, 24]`         | "in N hour(s) at 3:04 PM on Jan 2"         |
//! | `> 24`            | "upcoming event ... on January 2, 2006 ..."|
//!
//! Events already in the past land in the first bucket. Times are rendered
//! in UTC.

use crate::types::Timestamp;

/// Upper bound (inclusive) of the "starting soon" bucket, in hours.
pub const STARTING_SOON_HOURS: f64 = 1.0;

/// Upper bound (inclusive) of the "in N hour(s)" bucket, in hours.
pub const SAME_DAY_HOURS: f64 = 24.0;

/// Clock time only, 12-hour, no leading zero (e.g. `3:04 PM`).
const TIME_FORMAT: &str = "%-I:%M %p";

/// Clock time with short month and day (e.g. `3:04 PM on Jan 2`).
const TIME_AND_DAY_FORMAT: &str = "%-I:%M %p on %b %-d";

/// Full date and time (e.g. `January 2, 2006 at 3:04 PM`).
const FULL_DATE_FORMAT: &str = "%B %-d, %Y at %-I:%M %p";

/// Fractional hours from `now` until `starts_at`. Negative for past events.
pub fn hours_until(starts_at: Timestamp, now: Timestamp) -> f64 {
    (starts_at - now).num_milliseconds() as f64 / 3_600_000.0
}

/// Build the reminder text for `event_name` starting at `starts_at`.
///
/// The event name is interpolated verbatim; no escaping is applied.
pub fn compose_reminder(event_name: &str, starts_at: Timestamp, now: Timestamp) -> String {
    let hours = hours_until(starts_at, now);

    if hours <= STARTING_SOON_HOURS {
        format!(
            "Reminder: Your event '{event_name}' is starting soon at {}!",
            starts_at.format(TIME_FORMAT)
        )
    } else if hours <= SAME_DAY_HOURS {
        // Strictly positive here, so truncation is the floor.
        let whole_hours = hours.trunc() as i64;
        format!(
            "Reminder: Your event '{event_name}' is in {whole_hours} hour(s) at {}",
            starts_at.format(TIME_AND_DAY_FORMAT)
        )
    } else {
        format!(
            "Reminder: You have an upcoming event '{event_name}' on {}",
            starts_at.format(FULL_DATE_FORMAT)
        )
    }
}

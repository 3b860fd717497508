// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure calendar arithmetic for weekly slots.
//!
//! All functions are day-granularity and side-effect free. DST handling is
//! limited to [`to_display`]'s timezone conversion; the weekday math itself
//! never touches a timezone.

use beatbot_core::types::Weekday;
use beatbot_core::BeatbotError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

/// Timestamp format the provider uses in response bodies.
const PROVIDER_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// The next date strictly after `today` falling on `weekday`.
///
/// When `today` already falls on the target weekday the result is one
/// week out, never `today` itself.
pub fn next_occurrence(weekday: Weekday, today: NaiveDate) -> NaiveDate {
    let target = weekday.to_chrono().num_days_from_monday() as i64;
    let current = today.weekday().num_days_from_monday() as i64;
    let mut ahead = target - current;
    if ahead <= 0 {
        ahead += 7;
    }
    today + Duration::days(ahead)
}

/// [`next_occurrence`] with a time of day attached.
pub fn next_occurrence_at(weekday: Weekday, time: NaiveTime, today: NaiveDate) -> NaiveDateTime {
    next_occurrence(weekday, today).and_time(time)
}

/// Parse one of the provider's `date_begin` timestamps.
pub fn parse_provider_timestamp(value: &str) -> Result<DateTime<Utc>, BeatbotError> {
    NaiveDateTime::parse_from_str(value, PROVIDER_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| BeatbotError::Parse {
            message: format!("invalid provider timestamp {value:?}: {e}"),
        })
}

/// Convert a provider timestamp into the display timezone.
pub fn to_display(ts: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    ts.with_timezone(&tz)
}

/// Long display form, e.g. `Monday 07 Sep 6:00 PM`.
pub fn format_long(ts: DateTime<Utc>, tz: Tz) -> String {
    to_display(ts, tz).format("%A %d %b %-I:%M %p").to_string()
}

/// Short display form for inline buttons, e.g. `Mon 6:00 PM`.
pub fn format_short(ts: DateTime<Utc>, tz: Tz) -> String {
    to_display(ts, tz).format("%a %-I:%M %p").to_string()
}

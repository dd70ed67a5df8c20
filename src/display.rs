//! Small formatting helpers shared by the CLI and the HTTP API.

use chrono::{DateTime, Local, TimeZone, Utc};

/// `"Mar 5, 2026 - 3:07 PM"` in the given time zone.
pub fn format_timestamp_in<Tz: TimeZone>(dt: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.with_timezone(tz)
        .format("%b %-d, %Y - %-I:%M %p")
        .to_string()
}

/// [`format_timestamp_in`] using the machine's local time zone.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    format_timestamp_in(dt, &Local)
}

/// `"1 entry"` or `"N entries"`.
pub fn entry_count_label(n: usize) -> String {
    if n == 1 {
        "1 entry".to_string()
    } else {
        format!("{} entries", n)
    }
}

//! Time formatting utilities.

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;

/// Format for localized reset times: `2024-11-02 03:15:00 PM PDT`.
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p %Z";

/// Break a duration into days, hours and minutes.
///
/// Leading zero units are dropped and inner ones kept, so `3661s` gives
/// `1 hour 1 minute` and `2 days 0 hours 5 minutes` keeps its hours.
/// Seconds round to the nearest minute. Zero or negative durations render
/// as `0 minutes`; anything positive but under half a minute as
/// `under 1 minute`.
#[must_use]
pub fn format_breakdown(duration: TimeDelta) -> String {
    let seconds = duration.num_seconds();
    if seconds <= 0 {
        return "0 minutes".to_string();
    }

    let total_minutes = (seconds + 30) / 60;
    if total_minutes == 0 {
        return "under 1 minute".to_string();
    }

    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if days > 0 || hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    parts.push(plural(minutes, "minute"));
    parts.join(" ")
}

fn plural(value: i64, unit: &str) -> String {
    if value == 1 {
        format!("{value} {unit}")
    } else {
        format!("{value} {unit}s")
    }
}

/// Render an instant in `tz` with an explicit zone abbreviation.
#[must_use]
pub fn format_local(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(LOCAL_TIME_FORMAT).to_string()
}

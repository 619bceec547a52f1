//! Relative "saved at" labels for the favorites panel.

use chrono::{DateTime, Local, Utc};

/// Format `then` relative to the current time.
pub fn format_relative_now(then: DateTime<Utc>) -> String {
    format_relative(then, Utc::now())
}

/// Format `then` relative to `now`.
///
/// Bands are checked in order: under a minute is "Just now", then whole
/// minutes, hours and days (floored, singular at exactly one). A week or
/// more falls back to the local absolute date and time.
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);

    // Covers clock skew too: a future timestamp is "just now".
    if elapsed.num_seconds() < 60 {
        return "Just now".to_string();
    }

    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        return ago(minutes, "minute");
    }

    let hours = elapsed.num_hours();
    if hours < 24 {
        return ago(hours, "hour");
    }

    let days = elapsed.num_days();
    if days < 7 {
        return ago(days, "day");
    }

    format_absolute(then)
}

/// Local date and time, e.g. `10/06/26 14:03:11`.
pub fn format_absolute(then: DateTime<Utc>) -> String {
    then.with_timezone(&Local).format("%x %X").to_string()
}

fn ago(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

//! Human-readable "time ago" labels for the last-updated column.

use chrono::{DateTime, Utc};

const MS_PER_MINUTE: i64 = 60_000;

/// Label how long ago `updated_at` was, relative to `now`.
///
/// The difference is rounded to the nearest minute, ties rounding down.
/// Units are never singularised ("1 hours ago"), and a month is 30 days.
/// Timestamps in the future read as "Just now".
pub fn relative_time(updated_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(updated_at) = updated_at else {
        return "Unknown time".to_string();
    };

    let diff_ms = now.signed_duration_since(updated_at).num_milliseconds();
    let minutes = (diff_ms + MS_PER_MINUTE / 2 - 1).div_euclid(MS_PER_MINUTE);

    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} mins ago");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hours ago");
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{days} days ago");
    }

    format!("{} months ago", days / 30)
}

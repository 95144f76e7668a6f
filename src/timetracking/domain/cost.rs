//! Cost report formatting.

use chrono::TimeDelta;

/// Formats a duration truncated to whole seconds, e.g. `0s`, `45s`,
/// `10m0s`, `2h3m0s`.
///
/// Larger units are omitted while they are zero; once a unit is printed all
/// smaller units follow.
#[must_use]
pub fn format_whole_seconds(duration: TimeDelta) -> String {
    let sign = if duration < TimeDelta::zero() { "-" } else { "" };
    let total = duration.abs();
    let hours = total.num_hours();
    let minutes = total.num_minutes() - hours * 60;
    let seconds = total.num_seconds() - total.num_minutes() * 60;

    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}

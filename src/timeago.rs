use chrono::{DateTime, Utc};

/// Units from largest to smallest, in seconds. Months and years are the fixed
/// 30 and 365 day approximations.
const UNITS: [(&str, f64); 7] = [
    ("year", 3600.0 * 24.0 * 365.0),
    ("month", 3600.0 * 24.0 * 30.0),
    ("week", 3600.0 * 24.0 * 7.0),
    ("day", 3600.0 * 24.0),
    ("hour", 3600.0),
    ("minute", 60.0),
    ("second", 1.0),
];

/// English relative time of `date` as seen from `now`: "3 days ago",
/// "in 2 hours", "now".
///
/// Uses the largest unit strictly smaller than the elapsed time and rounds
/// half up, so 36 hours back reads as "1 day ago" and 36 hours ahead as
/// "in 2 days".
pub fn time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (date - now).num_milliseconds() as f64 / 1000.0;

    for (unit, seconds) in UNITS {
        if seconds < elapsed.abs() {
            let delta = (elapsed / seconds + 0.5).floor() as i64;
            let count = delta.abs();
            let plural = if count == 1 { "" } else { "s" };
            return if delta < 0 {
                format!("{} {}{} ago", count, unit, plural)
            } else {
                format!("in {} {}{}", count, unit, plural)
            };
        }
    }

    "now".to_string()
}

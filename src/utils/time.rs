use chrono::{Duration, NaiveDate, NaiveTime};

/// This is the standard way of converting a date to a string in watchme. Day files in the records
/// directory are named this way too.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Returns dates between start (inclusive) and end (inclusive). If end comes before start the
/// iterator is empty.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// Milliseconds since the epoch for UTC midnight of `date`.
pub fn utc_midnight_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

pub fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!(
            "{}h{}m{}s",
            v.num_hours(),
            v.num_minutes() % 60,
            v.num_seconds() % 60
        )
    } else if v.num_minutes() > 0 {
        format!("{}m{}s", v.num_minutes() % 60, v.num_seconds() % 60)
    } else {
        format!("{}s", v.num_seconds() % 60)
    }
}

/// Rounds a real valued amount of minutes to whole seconds for display. Amounts past what a
/// [Duration] can hold are clamped to [Duration::MAX].
pub fn minutes_to_duration(minutes: f64) -> Duration {
    let seconds = (minutes * 60.).round();
    if seconds.is_nan() || seconds <= 0. {
        return Duration::zero();
    }
    Duration::try_seconds(seconds as i64).unwrap_or(Duration::MAX)
}

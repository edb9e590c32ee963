pub mod types;

pub use types::{HolidaySet, WorkWindow};

use chrono::{DateTime, Datelike, Duration, DurationRound, NaiveDate, NaiveDateTime, Weekday};
use thiserror::Error;

/// Fixed offset of the local timezone from UTC (JST).
pub const LOCAL_OFFSET_HOURS: i64 = 9;

/// Unit label appended to the hour count by `format_duration`.
pub const HOURS_LABEL: &str = "時間";

/// Unit label appended to the minute count by `format_duration`.
pub const MINUTES_LABEL: &str = "分";

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("Invalid ISO-8601 timestamp {input:?}: {source}")]
    Parse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// A business day is a weekday that is not in the holiday set.
pub fn is_workday(date: NaiveDate, holidays: &HolidaySet) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.contains(date)
}

/// Business hours elapsed between two local timestamps.
///
/// Counts the minutes that fall inside `[start, end)`, on a business day, and
/// inside that day's work window. Both endpoints are truncated to whole
/// minutes first. Each calendar day between the two dates is evaluated on its
/// own, so weekends and holidays cost nothing regardless of how many there are.
///
/// Returns hours rounded to two decimals. Reversed or empty intervals, and
/// windows that do not open before they close, give `0.0`.
pub fn calculate_duration(
    start: NaiveDateTime,
    end: NaiveDateTime,
    window: &WorkWindow,
    holidays: &HolidaySet,
) -> f64 {
    let start = truncate_to_minute(start);
    let end = truncate_to_minute(end);
    if start >= end {
        return 0.0;
    }

    let (Some(opens), Some(closes)) = (window.start_time(), window.end_time()) else {
        return 0.0;
    };

    let total_minutes: i64 = start
        .date()
        .iter_days()
        .take_while(|day| *day <= end.date())
        .filter(|day| is_workday(*day, holidays))
        .map(|day| {
            let from = start.max(day.and_time(opens));
            let to = end.min(day.and_time(closes));
            if from < to {
                (to - from).num_minutes()
            } else {
                0
            }
        })
        .sum();

    round_hours(total_minutes)
}

/// Render fractional hours as e.g. `1時間30分`, `2時間` or `45分`.
pub fn format_duration(hours: f64) -> String {
    if hours == 0.0 {
        return format!("0{MINUTES_LABEL}");
    }

    let total_minutes = (hours * 60.0).floor() as i64;
    let h = total_minutes / 60;
    let m = total_minutes % 60;

    match (h > 0, m > 0) {
        (true, true) => format!("{h}{HOURS_LABEL}{m}{MINUTES_LABEL}"),
        (true, false) => format!("{h}{HOURS_LABEL}"),
        _ => format!("{m}{MINUTES_LABEL}"),
    }
}

/// Offset-bearing ISO-8601 shapes that RFC 3339 does not cover.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z"];

/// Offset-less ISO-8601 shapes, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Convert a UTC ISO-8601 timestamp (as `gh` reports it) to local wall-clock time.
///
/// A trailing `Z` is read as `+00:00`; a timestamp without any offset is taken
/// to be UTC. Input with another offset is converted through its instant. The
/// result carries no zone information.
pub fn normalize_to_local(utc: &str) -> Result<NaiveDateTime, TimestampError> {
    let normalized = match utc.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => utc.to_string(),
    };

    let instant = parse_as_utc(&normalized).map_err(|source| TimestampError::Parse {
        input: utc.to_string(),
        source,
    })?;

    Ok(instant + Duration::hours(LOCAL_OFFSET_HOURS))
}

// Reports the RFC 3339 error when no shape matches.
fn parse_as_utc(timestamp: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let rfc3339_err = match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => return Ok(dt.naive_utc()),
        Err(e) => e,
    };

    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(timestamp, format).ok())
        .map(|dt| dt.naive_utc())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(timestamp, format).ok())
        })
        .ok_or(rfc3339_err)
}

fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.duration_trunc(Duration::minutes(1)).unwrap_or(dt)
}

fn round_hours(minutes: i64) -> f64 {
    (minutes as f64 / 60.0 * 100.0).round() / 100.0
}

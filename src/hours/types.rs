use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Daily business-hours window in local wall-clock time.
///
/// Read once from the `[work_hours]` table and never mutated afterwards.
/// The calculator does not validate it: a window whose end is not after its
/// start simply contributes no minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WorkWindow {
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
}

impl WorkWindow {
    /// Clock time the window opens, or None if the configured values are out of range.
    pub fn start_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.start_hour, self.start_minute, 0)
    }

    /// Clock time the window closes, or None if the configured values are out of range.
    pub fn end_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.end_hour, self.end_minute, 0)
    }

    /// Length of one full business day in minutes (0 for a degenerate window).
    pub fn minutes_per_day(&self) -> i64 {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) if start < end => (end - start).num_minutes(),
            _ => 0,
        }
    }
}

#[cfg(test)]
impl WorkWindow {
    pub fn new(start_hour: u32, start_minute: u32, end_hour: u32, end_minute: u32) -> Self {
        Self {
            start_hour,
            start_minute,
            end_hour,
            end_minute,
        }
    }
}

impl std::fmt::Display for WorkWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_hour, self.start_minute, self.end_hour, self.end_minute
        )
    }
}

/// Calendar dates excluded from business-hours counting, on top of weekends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    dates: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }
}

impl FromIterator<NaiveDate> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

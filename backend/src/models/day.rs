use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A UTC calendar day with no time-of-day component.
///
/// All report arithmetic happens on whole days: ordering, subtraction and
/// weekday lookup never see a timestamp, so there is no timezone drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Day(NaiveDate);

/// Calendar years a report window may cover.
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

impl Day {
    /// 1970-01-01, the date used by settings entries that apply "since forever".
    pub fn epoch() -> Self {
        Self(NaiveDate::default())
    }

    /// Build a day from its calendar components.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse an effective-from key as stored by the settings collaborator.
    ///
    /// Accepts `YYYY-MM-DD` and the sentinel `"0"` for [`Day::epoch`].
    pub fn parse_effective_from(s: &str) -> Result<Self, chrono::ParseError> {
        if s.trim() == "0" {
            return Ok(Self::epoch());
        }
        s.parse()
    }

    /// Underlying chrono date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Weekday index with 0 = Sunday .. 6 = Saturday.
    pub fn weekday_index(&self) -> u8 {
        self.0.weekday().num_days_from_sunday() as u8
    }

    /// Day shifted by `days`, or `None` outside chrono's date range.
    pub fn checked_add_days(&self, days: i64) -> Option<Self> {
        TimeDelta::try_days(days)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Self)
    }

    /// Day shifted by `days` (negative moves backwards), saturating at the
    /// ends of chrono's date range.
    pub fn add_days(&self, days: i64) -> Self {
        self.checked_add_days(days).unwrap_or(if days < 0 {
            Self(NaiveDate::MIN)
        } else {
            Self(NaiveDate::MAX)
        })
    }

    /// Whether the day falls in [`SUPPORTED_YEARS`].
    pub fn is_supported(&self) -> bool {
        SUPPORTED_YEARS.contains(&self.0.year())
    }

    pub fn succ(&self) -> Self {
        self.add_days(1)
    }

    pub fn pred(&self) -> Self {
        self.add_days(-1)
    }

    /// Whole days from `self` to `other` (`other - self`).
    pub fn days_until(&self, other: Day) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Number of days in `[self, end]`, both ends included. Zero when `end < self`.
    pub fn span_inclusive(&self, end: Day) -> u32 {
        let days = self.days_until(end) + 1;
        if days <= 0 {
            0
        } else {
            days as u32
        }
    }
}

impl From<NaiveDate> for Day {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<Day> for NaiveDate {
    fn from(day: Day) -> Self {
        day.0
    }
}

impl FromStr for Day {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(Self)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
#[path = "day_tests.rs"]
mod day_tests;

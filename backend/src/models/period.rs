//! Reporting windows and the period units used to step back through trends.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Day;

/// Inclusive `[start, end]` day range of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: Day,
    pub end: Day,
}

impl ReportWindow {
    /// Build a window, swapping the bounds when they arrive reversed.
    pub fn new(start: Day, end: Day) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// A window is closed once its last day lies before `today`.
    pub fn is_closed(&self, today: Day) -> bool {
        self.end < today
    }

    pub fn is_open(&self, today: Day) -> bool {
        !self.is_closed(today)
    }

    pub fn contains(&self, day: Day) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of days in the window.
    pub fn total_days(&self) -> u32 {
        self.start.span_inclusive(self.end)
    }

    /// Days from `start` through `today` inclusive, capped at the window length.
    pub fn days_until(&self, today: Day) -> u32 {
        if today < self.start {
            return 0;
        }
        self.start.span_inclusive(today.min(self.end))
    }

    /// Part of the window that has already happened, today included.
    pub fn elapsed(&self, today: Day) -> Option<ReportWindow> {
        if today < self.start {
            None
        } else {
            Some(Self {
                start: self.start,
                end: self.end.min(today),
            })
        }
    }

    /// Same window moved `n` period units into the past, `None` when that
    /// leaves chrono's date range.
    pub fn shifted_back(&self, unit: PeriodUnit, n: u32) -> Option<ReportWindow> {
        let start = unit.shift_back(self.start, n)?;
        let mut end = unit.shift_back(self.end, n)?;
        if unit != PeriodUnit::Week && is_month_end(self.end.date()) {
            end = last_day_of_month(end.date()).into();
        }
        Some(Self::new(start, end))
    }
}

impl fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Unit a report period is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    #[default]
    Week,
    Month,
    Year,
}

impl PeriodUnit {
    /// Move `day` back by `n` units. Month and year shifts clamp to the last
    /// valid day of the target month.
    pub fn shift_back(&self, day: Day, n: u32) -> Option<Day> {
        let date = day.date();
        match self {
            Self::Week => day.checked_add_days(-7 * i64::from(n)),
            Self::Month => date.checked_sub_months(Months::new(n)).map(Day::from),
            Self::Year => n
                .checked_mul(12)
                .and_then(|months| date.checked_sub_months(Months::new(months)))
                .map(Day::from),
        }
    }

    /// Human label of the period starting at `day`: ISO week number, `YYYY-MM`
    /// or `YYYY`.
    pub fn label(&self, day: Day) -> String {
        let date = day.date();
        match self {
            Self::Week => date.iso_week().week().to_string(),
            Self::Month => date.format("%Y-%m").to_string(),
            Self::Year => date.format("%Y").to_string(),
        }
    }

    /// Calendar period of this unit containing `today` (ISO weeks start on Monday).
    pub fn current_window(&self, today: Day) -> ReportWindow {
        let date = today.date();
        let (start, end) = match self {
            Self::Week => {
                let from_monday = date.weekday().num_days_from_monday() as i64;
                let start = today.add_days(-from_monday);
                (start, start.add_days(6))
            }
            Self::Month => {
                let first = date.with_day(1).unwrap_or(date);
                (first.into(), last_day_of_month(date).into())
            }
            Self::Year => {
                let first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
                let last = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
                (first.into(), last.into())
            }
        };
        ReportWindow::new(start, end)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Period name other than `week`, `month` or `year`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown period unit: {0}")]
pub struct UnknownPeriodUnit(pub String);

impl FromStr for PeriodUnit {
    type Err = UnknownPeriodUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(UnknownPeriodUnit(s.to_string())),
        }
    }
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

fn is_month_end(date: NaiveDate) -> bool {
    last_day_of_month(date) == date
}

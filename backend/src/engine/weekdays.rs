use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Day, WeekdaySet};

/// Occurrences of each requested weekday within a day range.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WeekdayCounts {
    pub counts: BTreeMap<u8, u32>,
    pub total: u32,
}

/// Count how many days in `[start, end]` (both inclusive) fall on each weekday of `weekdays`.
///
/// Every requested weekday gets an entry, zero included. An empty or reversed
/// range counts nothing.
pub fn count_weekdays(start: Day, end: Day, weekdays: &WeekdaySet) -> WeekdayCounts {
    let days = start.span_inclusive(end);
    let full_weeks = days / 7;
    let remainder = days % 7;
    let first = start.weekday_index() as u32;

    let mut result = WeekdayCounts::default();
    for weekday in weekdays.iter() {
        let offset = (weekday as u32 + 7 - first) % 7;
        let count = full_weeks + u32::from(offset < remainder);
        result.counts.insert(weekday, count);
        result.total += count;
    }
    result
}

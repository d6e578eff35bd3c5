//! Expected-value aggregation per account.
//!
//! The [`AccountLedger`] built here is the accumulator threaded through the
//! rest of a computation: [`super::actuals`] folds registrations into it and
//! the report services read the final totals. A ledger lives for one report
//! window of one account and is never shared.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::partition::partition;
use super::weekdays::count_weekdays;
use crate::models::{Day, ReportWindow, SettingsTimeline, WeekdaySet, WeeklyAmount};

/// Tally of one sub-interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubintervalTally {
    pub start: Day,
    pub end: Day,
    /// Weekdays that earn registration credit; `None` when every day does.
    #[serde(skip)]
    pub weekdays: Option<WeekdaySet>,
    /// Expected value of a single expected day.
    pub daily_value: f64,
    pub expected_days: u32,
    pub expected_units: f64,
    pub registered_days: u32,
}

impl SubintervalTally {
    pub fn contains(&self, day: Day) -> bool {
        self.start <= day && day <= self.end
    }

    /// Whether a registration on `day` earns credit in this sub-interval.
    pub fn credits(&self, day: Day) -> bool {
        self.weekdays
            .map_or(true, |set| set.contains(day.weekday_index()))
    }

    /// Expected days from the sub-interval start through `cutoff`.
    pub fn expected_days_until(&self, cutoff: Day) -> u32 {
        if cutoff < self.start {
            return 0;
        }
        let end = self.end.min(cutoff);
        match &self.weekdays {
            Some(set) => count_weekdays(self.start, end, set).total,
            None => self.start.span_inclusive(end),
        }
    }
}

/// Running totals of one account.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedTotals {
    pub expected_days: u32,
    pub registered_days: u32,
    pub expected_units: f64,
    pub actual_amount: f64,
    pub actual_cost: f64,
    /// Expected units credited for days without any registration.
    pub backfilled_units: f64,
}

/// Expected values of one account over one window, ready to receive actuals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLedger {
    pub totals: ExpectedTotals,
    /// Keyed by the `effective_from` of the governing settings entry.
    pub subintervals: BTreeMap<Day, SubintervalTally>,
    /// Expected registrations per weekday, weekday timelines only.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub regs_to_have_per_dow: BTreeMap<Day, BTreeMap<u8, u32>>,
    #[serde(skip)]
    pub(crate) credited_days: BTreeSet<Day>,
}

impl AccountLedger {
    /// Sub-interval holding `day`, scanning in ascending start order.
    pub fn tally_for_mut(&mut self, day: Day) -> Option<&mut SubintervalTally> {
        self.subintervals.values_mut().find(|t| t.contains(day))
    }

    /// Expected days from the window start through `cutoff`.
    pub fn expected_days_until(&self, cutoff: Day) -> u32 {
        self.subintervals
            .values()
            .map(|t| t.expected_days_until(cutoff))
            .sum()
    }
}

/// Ledger for a registration-days timeline: each expected weekday is worth one unit.
pub fn weekday_ledger(timeline: &SettingsTimeline<WeekdaySet>, window: ReportWindow) -> AccountLedger {
    let mut ledger = AccountLedger::default();
    for sub in partition(timeline, window) {
        let counts = count_weekdays(sub.start, sub.end, &sub.value);
        ledger.totals.expected_days += counts.total;
        ledger.totals.expected_units += counts.total as f64;
        ledger.subintervals.insert(
            sub.key,
            SubintervalTally {
                start: sub.start,
                end: sub.end,
                weekdays: Some(sub.value),
                daily_value: 1.0,
                expected_days: counts.total,
                expected_units: counts.total as f64,
                registered_days: 0,
            },
        );
        ledger.regs_to_have_per_dow.insert(sub.key, counts.counts);
    }
    ledger
}

/// Ledger for a weekly-amount timeline: every day carries a seventh of the weekly amount.
pub fn weight_ledger(timeline: &SettingsTimeline<WeeklyAmount>, window: ReportWindow) -> AccountLedger {
    let mut ledger = AccountLedger::default();
    for sub in partition(timeline, window) {
        let days = sub.days();
        let expected_units = sub.value.over_days(days);
        ledger.totals.expected_days += days;
        ledger.totals.expected_units += expected_units;
        ledger.subintervals.insert(
            sub.key,
            SubintervalTally {
                start: sub.start,
                end: sub.end,
                weekdays: None,
                daily_value: sub.value.daily(),
                expected_days: days,
                expected_units,
                registered_days: 0,
            },
        );
    }
    ledger
}

//! Folding actual registrations into an [`AccountLedger`].

use log::debug;

use super::expected::AccountLedger;
use crate::models::{Day, RegistrationRow};

/// Outcome of folding one account's rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoldSummary {
    pub matched: usize,
    /// Rows outside every sub-interval or on a weekday without credit.
    pub skipped: usize,
}

/// Fold registration rows of a single account into its ledger.
///
/// Each row lands in the sub-interval holding its date. Rows on weekdays the
/// governing settings do not expect are skipped. A date earns one registered
/// day however many rows it has.
pub fn fold_registrations<'a, I>(ledger: &mut AccountLedger, rows: I) -> FoldSummary
where
    I: IntoIterator<Item = &'a RegistrationRow>,
{
    let mut summary = FoldSummary::default();
    for row in rows {
        let first_on_day = !ledger.credited_days.contains(&row.date);
        let Some(tally) = ledger.tally_for_mut(row.date) else {
            summary.skipped += 1;
            continue;
        };
        if !tally.credits(row.date) {
            summary.skipped += 1;
            continue;
        }
        if first_on_day {
            tally.registered_days += 1;
            ledger.credited_days.insert(row.date);
            ledger.totals.registered_days += 1;
        }
        ledger.totals.actual_amount += row.amount.unwrap_or(0.0);
        ledger.totals.actual_cost += row.cost.unwrap_or(0.0);
        summary.matched += 1;
    }
    if summary.skipped > 0 {
        debug!(
            "fold_registrations: matched={} skipped={}",
            summary.matched, summary.skipped
        );
    }
    summary
}

/// Credit every expected day without a registration, up to `cutoff`, at its
/// sub-interval's daily value. Returns the units added.
///
/// Days after `cutoff` have not happened yet and are never back-filled.
pub fn back_fill(ledger: &mut AccountLedger, cutoff: Day) -> f64 {
    let mut added = 0.0;
    for tally in ledger.subintervals.values() {
        let expected = tally.expected_days_until(cutoff);
        let missing = expected.saturating_sub(tally.registered_days);
        added += missing as f64 * tally.daily_value;
    }
    ledger.totals.backfilled_units += added;
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::expected::{weekday_ledger, weight_ledger};
    use crate::models::{ReportWindow, SettingsEntry, SettingsTimeline, WeekdaySet, WeeklyAmount};

    fn day(s: &str) -> Day {
        s.parse().unwrap()
    }

    fn week() -> ReportWindow {
        ReportWindow::new(day("2018-08-13"), day("2018-08-19"))
    }

    #[test]
    fn test_rows_on_expected_weekdays_count_once_per_day() {
        let timeline = SettingsTimeline::constant(WeekdaySet::from_indices(&[1, 3, 5]).unwrap());
        let mut ledger = weekday_ledger(&timeline, week());
        let rows = vec![
            RegistrationRow::new("a", day("2018-08-13")),
            RegistrationRow::new("a", day("2018-08-13")),
            RegistrationRow::new("a", day("2018-08-15")),
        ];

        let summary = fold_registrations(&mut ledger, &rows);

        assert_eq!(summary.matched, 3);
        assert_eq!(ledger.totals.registered_days, 2);
        assert_eq!(ledger.subintervals[&Day::epoch()].registered_days, 2);
    }

    #[test]
    fn test_rows_on_unexpected_weekday_are_skipped() {
        let timeline = SettingsTimeline::constant(WeekdaySet::from_indices(&[1]).unwrap());
        let mut ledger = weekday_ledger(&timeline, week());
        // Tuesday and a date outside the window
        let rows = vec![
            RegistrationRow::new("a", day("2018-08-14")).with_amount(100.0),
            RegistrationRow::new("a", day("2018-08-20")),
        ];

        let summary = fold_registrations(&mut ledger, &rows);

        assert_eq!(summary.skipped, 2);
        assert_eq!(ledger.totals.registered_days, 0);
        assert_eq!(ledger.totals.actual_amount, 0.0);
    }

    #[test]
    fn test_rows_land_in_their_subinterval() {
        let timeline = SettingsTimeline::new(vec![
            SettingsEntry::new(Day::epoch(), WeeklyAmount(7000.0)),
            SettingsEntry::new(day("2018-08-16"), WeeklyAmount(14000.0)),
        ])
        .unwrap();
        let mut ledger = weight_ledger(&timeline, week());
        let rows = vec![
            RegistrationRow::new("a", day("2018-08-15")).with_amount(900.0).with_cost(90.0),
            RegistrationRow::new("a", day("2018-08-16")).with_amount(1500.0).with_cost(150.0),
            RegistrationRow::new("a", day("2018-08-19")).with_amount(2500.0).with_cost(250.0),
        ];

        fold_registrations(&mut ledger, &rows);

        assert_eq!(ledger.subintervals[&Day::epoch()].registered_days, 1);
        assert_eq!(ledger.subintervals[&day("2018-08-16")].registered_days, 2);
        assert_eq!(ledger.totals.actual_amount, 4900.0);
        assert_eq!(ledger.totals.actual_cost, 490.0);
    }

    #[test]
    fn test_back_fill_missing_days() {
        let timeline = SettingsTimeline::new(vec![
            SettingsEntry::new(Day::epoch(), WeeklyAmount(7000.0)),
            SettingsEntry::new(day("2018-08-16"), WeeklyAmount(14000.0)),
        ])
        .unwrap();
        let mut ledger = weight_ledger(&timeline, week());
        let rows = vec![
            RegistrationRow::new("a", day("2018-08-13")).with_amount(800.0),
            RegistrationRow::new("a", day("2018-08-17")).with_amount(1800.0),
        ];
        fold_registrations(&mut ledger, &rows);

        // 2 missing days at 1000 + 3 missing days at 2000
        let added = back_fill(&mut ledger, day("2018-08-19"));
        assert_eq!(added, 8000.0);
        assert_eq!(ledger.totals.backfilled_units, 8000.0);
    }

    #[test]
    fn test_back_fill_stops_at_cutoff() {
        let timeline = SettingsTimeline::constant(WeeklyAmount(7000.0));
        let mut ledger = weight_ledger(&timeline, week());
        fold_registrations(
            &mut ledger,
            &[RegistrationRow::new("a", day("2018-08-13")).with_amount(500.0)],
        );

        // Only 2018-08-14 and 2018-08-15 are missing so far
        assert_eq!(back_fill(&mut ledger, day("2018-08-15")), 2000.0);
    }
}

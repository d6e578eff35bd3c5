#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use fw_reports::db::LocalRepository;
use fw_reports::models::{
    Day, RegistrationRow, ReportWindow, SettingsEntry, SettingsTimeline, WeekdaySet, WeeklyAmount,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn day(s: &str) -> Day {
    s.parse().expect("valid test date")
}

/// ISO week 33 of 2018, Monday to Sunday.
pub fn week_33() -> ReportWindow {
    ReportWindow::new(day("2018-08-13"), day("2018-08-19"))
}

pub fn weekdays(indices: &[u8]) -> WeekdaySet {
    WeekdaySet::from_indices(indices).expect("valid weekday indices")
}

/// The four-change timeline of the worked example spanning August 2018.
pub fn changing_weekdays() -> SettingsTimeline<WeekdaySet> {
    SettingsTimeline::new(vec![
        SettingsEntry::new(Day::epoch(), weekdays(&[1, 3])),
        SettingsEntry::new(day("2018-08-10"), weekdays(&[1, 5, 6])),
        SettingsEntry::new(day("2018-08-20"), weekdays(&[1, 2, 3, 4, 5])),
        SettingsEntry::new(day("2018-08-25"), weekdays(&[0, 1, 3])),
    ])
    .expect("sorted timeline")
}

/// One row per day of `window`, each weighing `amount` and costing `cost`.
pub fn daily_rows(account: &str, window: ReportWindow, amount: f64, cost: f64) -> Vec<RegistrationRow> {
    (0..window.total_days() as i64)
        .map(|i| {
            RegistrationRow::new(account, window.start.add_days(i))
                .with_amount(amount)
                .with_cost(cost)
        })
        .collect()
}

/// Repository with two well-behaved accounts and one that never registers.
///
/// - `kitchen-a`: Monday/Wednesday/Friday, 7000 g/week, registers every day of week 33
/// - `kitchen-b`: every day, 14000 g/week, registers every day of week 33
/// - `kitchen-c`: every day, 7000 g/week, no registrations
pub fn seeded_repository() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.set_registration_days("kitchen-a", SettingsTimeline::constant(weekdays(&[1, 3, 5])));
    repo.set_registration_days("kitchen-b", SettingsTimeline::constant(WeekdaySet::EVERY_DAY));
    repo.set_registration_days("kitchen-c", SettingsTimeline::constant(WeekdaySet::EVERY_DAY));
    repo.set_expected_waste("kitchen-a", SettingsTimeline::constant(WeeklyAmount(7000.0)));
    repo.set_expected_waste("kitchen-b", SettingsTimeline::constant(WeeklyAmount(14000.0)));
    repo.set_expected_waste("kitchen-c", SettingsTimeline::constant(WeeklyAmount(7000.0)));
    repo.add_registrations(daily_rows("kitchen-a", week_33(), 800.0, 1600.0));
    repo.add_registrations(daily_rows("kitchen-b", week_33(), 2000.0, 3000.0));
    repo
}

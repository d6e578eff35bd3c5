//! Waste report.
//!
//! Compares registered waste amounts against the expected weekly waste of each
//! account. Days an account did not register on are back-filled at the
//! expected daily rate, so skipping registrations never looks like less waste.

use log::debug;
use serde::Serialize;
use std::collections::HashMap;

use super::config::ReportConfig;
use super::error::{ReportError, ReportResult};
use super::fetch;
use super::request::{ReportMeta, ReportRequest};
use super::sufficiency::{self, GateOutcome};
use crate::db::repository::settings::TimelineMap;
use crate::db::FullRepository;
use crate::engine::{
    back_fill, build_trend, fold_registrations, forecast, percentage, weight_ledger, INSUFFICIENT,
};
use crate::models::{
    AccountId, Day, RegistrationRow, ReportWindow, SettingsTimeline, WeeklyAmount,
};

/// Waste figures of one account, or of all reported accounts together.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteFigures {
    /// Expected waste over the whole window.
    pub expected_amount: f64,
    /// Expected waste from the window start through today.
    pub expected_to_date: f64,
    /// Registered plus back-filled waste, `-1` without enough data.
    pub actual_amount: f64,
    pub on_target: bool,
    pub percentage: i64,
    /// Open windows only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecasted_amount: Option<f64>,
}

impl WasteFigures {
    fn measured(
        expected_amount: f64,
        expected_to_date: f64,
        actual: f64,
        window: ReportWindow,
        today: Day,
    ) -> Self {
        let percentage = percentage(actual, expected_to_date);
        Self {
            expected_amount,
            expected_to_date,
            actual_amount: actual,
            on_target: percentage != INSUFFICIENT && actual <= expected_to_date,
            percentage,
            forecasted_amount: forecast(actual, window, today),
        }
    }

    fn insufficient(
        expected_amount: f64,
        expected_to_date: f64,
        window: ReportWindow,
        today: Day,
    ) -> Self {
        Self {
            expected_amount,
            expected_to_date,
            actual_amount: INSUFFICIENT as f64,
            on_target: false,
            percentage: INSUFFICIENT,
            forecasted_amount: window.is_open(today).then_some(INSUFFICIENT as f64),
        }
    }
}

/// Waste of every account in one window.
#[derive(Debug, Clone, PartialEq)]
pub struct WasteSlot {
    pub per_account: HashMap<AccountId, WasteFigures>,
    pub totals: WasteFigures,
    pub quorum_met: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteTrendPoint {
    pub period_label: String,
    pub on_target: bool,
    pub percentage: i64,
    /// Expected waste of the slot.
    pub max_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountWaste {
    pub account_id: AccountId,
    #[serde(flatten)]
    pub figures: WasteFigures,
    pub trend: Vec<WasteTrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteReport {
    #[serde(flatten)]
    pub meta: ReportMeta,
    pub quorum_met: bool,
    pub totals: WasteFigures,
    pub accounts: Vec<AccountWaste>,
}

/// Expected and actual waste of one account: `(expected, expected_to_date, actual)`.
fn account_amounts(
    timeline: &SettingsTimeline<WeeklyAmount>,
    rows: Option<&Vec<RegistrationRow>>,
    window: ReportWindow,
    today: Day,
) -> (f64, f64, f64) {
    let expected = weight_ledger(timeline, window).totals.expected_units;
    let Some(elapsed) = window.elapsed(today) else {
        return (expected, 0.0, 0.0);
    };
    let mut ledger = weight_ledger(timeline, elapsed);
    if let Some(rows) = rows {
        fold_registrations(&mut ledger, rows);
    }
    let backfilled = back_fill(&mut ledger, elapsed.end);
    (
        expected,
        ledger.totals.expected_units,
        ledger.totals.actual_amount + backfilled,
    )
}

/// Waste of every account of `timelines` in `window`.
///
/// `rows` must be restricted to the elapsed part of the window. Accounts the
/// gate does not report get `-1` values, and the totals only sum the accounts
/// that are reported. A missed quorum degrades the totals as well.
pub fn compute_waste(
    timelines: &TimelineMap<WeeklyAmount>,
    rows: &HashMap<AccountId, Vec<RegistrationRow>>,
    outcome: &GateOutcome,
    window: ReportWindow,
    today: Day,
) -> WasteSlot {
    let mut per_account = HashMap::new();
    let (mut expected, mut to_date, mut actual) = (0.0, 0.0, 0.0);

    for (account, timeline) in timelines {
        let (acc_expected, acc_to_date, acc_actual) =
            account_amounts(timeline, rows.get(account), window, today);
        let figures = if outcome.reports(account) {
            expected += acc_expected;
            to_date += acc_to_date;
            actual += acc_actual;
            WasteFigures::measured(acc_expected, acc_to_date, acc_actual, window, today)
        } else {
            WasteFigures::insufficient(acc_expected, acc_to_date, window, today)
        };
        per_account.insert(account.clone(), figures);
    }

    let totals = if outcome.quorum_met {
        WasteFigures::measured(expected, to_date, actual, window, today)
    } else {
        let expected: f64 = per_account.values().map(|f| f.expected_amount).sum();
        let to_date: f64 = per_account.values().map(|f| f.expected_to_date).sum();
        WasteFigures::insufficient(expected, to_date, window, today)
    };

    WasteSlot {
        per_account,
        totals,
        quorum_met: outcome.quorum_met,
    }
}

/// Waste report for the requested window plus its trend.
pub async fn waste_report(
    repo: &dyn FullRepository,
    request: &ReportRequest,
    config: &ReportConfig,
) -> ReportResult<WasteReport> {
    config.validate()?;
    let req = request.normalize()?;
    let (waste, registration_days) = futures::try_join!(
        fetch::expected_waste(repo, &req.accounts, req.window),
        fetch::optional_registration_days(repo, &req.accounts, req.window)
    )?;
    let missing = fetch::without_settings(&req.accounts, &waste);
    let accounts: Vec<AccountId> = req
        .accounts
        .iter()
        .filter(|a| waste.contains_key(*a))
        .cloned()
        .collect();
    debug!(
        "waste_report: window={} accounts={} without_settings={}",
        req.window,
        accounts.len(),
        missing.len()
    );

    let today = req.today;
    let gate = config.gate();
    let requested = req.accounts.len();
    let (accounts_ref, waste_ref, days_ref) = (&accounts, &waste, &registration_days);
    let slot = move |window: ReportWindow| async move {
        let elapsed = window.elapsed(today);
        let (rows, day_counts) = futures::try_join!(
            fetch::registrations_by_account(repo, accounts_ref, elapsed),
            fetch::registration_day_counts(repo, accounts_ref, elapsed)
        )?;
        let outcome = sufficiency::evaluate(
            &gate,
            accounts_ref,
            requested,
            days_ref,
            &day_counts,
            elapsed,
        );
        Ok::<_, ReportError>(compute_waste(waste_ref, &rows, &outcome, window, today))
    };

    let (mut current, trend) = futures::try_join!(
        slot(req.window),
        build_trend(req.window, req.period, config.trend_periods, slot)
    )?;

    let accounts = accounts
        .into_iter()
        .filter_map(|account| {
            let figures = current.per_account.remove(&account)?;
            let trend = trend
                .iter()
                .map(|slot| {
                    let point = slot.result.per_account.get(&account);
                    WasteTrendPoint {
                        period_label: slot.period_label.clone(),
                        on_target: point.map_or(false, |p| p.on_target),
                        percentage: point.map_or(INSUFFICIENT, |p| p.percentage),
                        max_cost: point.map_or(0.0, |p| p.expected_amount),
                    }
                })
                .collect();
            Some(AccountWaste {
                account_id: account,
                figures,
                trend,
            })
        })
        .collect();

    Ok(WasteReport {
        meta: req.meta(missing),
        quorum_met: current.quorum_met,
        totals: current.totals,
        accounts,
    })
}

#[cfg(test)]
#[path = "waste_tests.rs"]
mod waste_tests;

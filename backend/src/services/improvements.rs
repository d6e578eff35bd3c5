//! Improvement report.
//!
//! Prices the expected waste of each account at the account's own average
//! cost per unit and reports how much of that expected cost was saved.

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
    back_fill, build_trend, expected_cost, fold_registrations, forecast, improvement_cost,
    weight_ledger, INSUFFICIENT,
};
use crate::models::{
    AccountId, Day, RegistrationRow, ReportWindow, SettingsTimeline, WeeklyAmount,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementFigures {
    /// Cost per registered unit over the elapsed window.
    pub avg_cost: f64,
    pub expected_weight: f64,
    pub expected_cost: f64,
    /// `-1` without enough data.
    pub actual_cost: f64,
    /// `-1` without enough data.
    pub improvement_cost: f64,
    pub on_target: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecasted_cost: Option<f64>,
}

/// Cost inputs of one account in one window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct CostInputs {
    avg_cost: f64,
    expected_weight: f64,
    expected_cost: f64,
    actual_cost: f64,
}

impl ImprovementFigures {
    fn measured(inputs: CostInputs, window: ReportWindow, today: Day) -> Self {
        let improvement = improvement_cost(inputs.expected_cost, inputs.actual_cost);
        Self {
            avg_cost: inputs.avg_cost,
            expected_weight: inputs.expected_weight,
            expected_cost: inputs.expected_cost,
            actual_cost: inputs.actual_cost,
            improvement_cost: improvement,
            on_target: inputs.actual_cost <= inputs.expected_cost,
            forecasted_cost: forecast(improvement, window, today),
        }
    }

    fn insufficient(inputs: CostInputs, window: ReportWindow, today: Day) -> Self {
        Self {
            avg_cost: inputs.avg_cost,
            expected_weight: inputs.expected_weight,
            expected_cost: inputs.expected_cost,
            actual_cost: INSUFFICIENT as f64,
            improvement_cost: INSUFFICIENT as f64,
            on_target: false,
            forecasted_cost: window.is_open(today).then_some(INSUFFICIENT as f64),
        }
    }
}

/// Improvement of every account in one window.
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementSlot {
    pub per_account: HashMap<AccountId, ImprovementFigures>,
    pub totals: ImprovementFigures,
    pub quorum_met: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementTrendPoint {
    pub period_label: String,
    pub on_target: bool,
    pub improvement_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountImprovement {
    pub account_id: AccountId,
    #[serde(flatten)]
    pub figures: ImprovementFigures,
    pub trend: Vec<ImprovementTrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementReport {
    #[serde(flatten)]
    pub meta: ReportMeta,
    pub quorum_met: bool,
    pub totals: ImprovementFigures,
    pub accounts: Vec<AccountImprovement>,
}

/// `sum(cost) / sum(amount)`, 0 when nothing was weighed.
pub fn average_cost<'a, I>(rows: I) -> f64
where
    I: IntoIterator<Item = &'a RegistrationRow>,
{
    let (cost, amount) = rows.into_iter().fold((0.0, 0.0), |(cost, amount), row| {
        (cost + row.cost.unwrap_or(0.0), amount + row.amount.unwrap_or(0.0))
    });
    if amount > 0.0 {
        cost / amount
    } else {
        0.0
    }
}

fn cost_inputs(
    timeline: &SettingsTimeline<WeeklyAmount>,
    rows: &[RegistrationRow],
    window: ReportWindow,
    today: Day,
) -> CostInputs {
    let avg_cost = average_cost(rows);
    let expected_weight = weight_ledger(timeline, window).totals.expected_units;
    let expected = expected_cost(expected_weight, avg_cost, window, today);
    let Some(elapsed) = window.elapsed(today) else {
        return CostInputs {
            avg_cost,
            expected_weight,
            expected_cost: expected,
            actual_cost: 0.0,
        };
    };

    let mut ledger = weight_ledger(timeline, elapsed);
    fold_registrations(&mut ledger, rows);
    let backfilled = back_fill(&mut ledger, elapsed.end);
    CostInputs {
        avg_cost,
        expected_weight,
        expected_cost: expected,
        actual_cost: ledger.totals.actual_cost + backfilled * avg_cost,
    }
}

/// Improvement of every account of `timelines` in `window`.
///
/// Same gating rules as the waste report. Totals compare summed expected and
/// actual costs of the reported accounts; `avgCost` of the totals is the
/// overall cost per unit of their rows.
pub fn compute_improvements(
    timelines: &TimelineMap<WeeklyAmount>,
    rows: &HashMap<AccountId, Vec<RegistrationRow>>,
    outcome: &GateOutcome,
    window: ReportWindow,
    today: Day,
) -> ImprovementSlot {
    let mut per_account = HashMap::new();
    let mut totals = CostInputs::default();
    let mut reported_rows: Vec<&RegistrationRow> = Vec::new();

    for (account, timeline) in timelines {
        let account_rows = rows.get(account).map(Vec::as_slice).unwrap_or_default();
        let inputs = cost_inputs(timeline, account_rows, window, today);
        let figures = if outcome.reports(account) {
            totals.expected_weight += inputs.expected_weight;
            totals.expected_cost += inputs.expected_cost;
            totals.actual_cost += inputs.actual_cost;
            reported_rows.extend(account_rows);
            ImprovementFigures::measured(inputs, window, today)
        } else {
            ImprovementFigures::insufficient(inputs, window, today)
        };
        per_account.insert(account.clone(), figures);
    }

    totals.avg_cost = average_cost(reported_rows);

    let totals = if outcome.quorum_met {
        ImprovementFigures::measured(totals, window, today)
    } else {
        ImprovementFigures::insufficient(totals, window, today)
    };

    ImprovementSlot {
        per_account,
        totals,
        quorum_met: outcome.quorum_met,
    }
}

/// Improvement report for the requested window plus its trend.
pub async fn improvement_report(
    repo: &dyn FullRepository,
    request: &ReportRequest,
    config: &ReportConfig,
) -> ReportResult<ImprovementReport> {
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
        "improvement_report: window={} accounts={} without_settings={}",
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
        Ok::<_, ReportError>(compute_improvements(
            waste_ref, &rows, &outcome, window, today,
        ))
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
                    ImprovementTrendPoint {
                        period_label: slot.period_label.clone(),
                        on_target: point.map_or(false, |p| p.on_target),
                        improvement_cost: point
                            .map_or(INSUFFICIENT as f64, |p| p.improvement_cost),
                    }
                })
                .collect();
            Some(AccountImprovement {
                account_id: account,
                figures,
                trend,
            })
        })
        .collect();

    Ok(ImprovementReport {
        meta: req.meta(missing),
        quorum_met: current.quorum_met,
        totals: current.totals,
        accounts,
    })
}

#[cfg(test)]
#[path = "improvements_tests.rs"]
mod improvements_tests;

//! Registration frequency report.
//!
//! Scores how many of the expected registration days each account actually
//! registered on, for the requested window and its trailing periods.

use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::config::ReportConfig;
use super::error::{ReportError, ReportResult};
use super::fetch;
use super::request::{ReportMeta, ReportRequest};
use crate::db::repository::settings::TimelineMap;
use crate::db::FullRepository;
use crate::engine::{
    build_trend, fold_registrations, on_target_and_value, weekday_ledger, AccountLedger,
    INSUFFICIENT,
};
use crate::models::{AccountId, Day, RegistrationRow, ReportWindow, WeekdaySet};

/// Frequency figures of one account (or of all accounts together) in one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyFigures {
    pub expected_days: u32,
    pub registered_days: u32,
    pub on_target: bool,
    pub frequency: i64,
}

impl FrequencyFigures {
    fn from_counts(expected_days: u32, registered_days: u32) -> Self {
        let value = on_target_and_value(expected_days, registered_days);
        Self {
            expected_days,
            registered_days,
            on_target: value.on_target,
            frequency: value.frequency,
        }
    }
}

/// Frequency of every account in one window.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySlot {
    pub per_account: HashMap<AccountId, FrequencyFigures>,
    pub regs_to_have_per_dow: HashMap<AccountId, BTreeMap<Day, BTreeMap<u8, u32>>>,
    pub totals: FrequencyFigures,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyTrendPoint {
    pub period_label: String,
    pub on_target: bool,
    pub percentage: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFrequency {
    pub account_id: AccountId,
    #[serde(flatten)]
    pub figures: FrequencyFigures,
    pub regs_to_have_per_dow: BTreeMap<Day, BTreeMap<u8, u32>>,
    pub trend: Vec<FrequencyTrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyReport {
    #[serde(flatten)]
    pub meta: ReportMeta,
    pub totals: FrequencyFigures,
    pub accounts: Vec<AccountFrequency>,
}

/// Score every account of `timelines` over the elapsed part of `window`.
///
/// `rows` must already be restricted to that elapsed part. A window that has
/// not started yet expects nothing and scores [`INSUFFICIENT`].
pub fn compute_frequency(
    timelines: &TimelineMap<WeekdaySet>,
    rows: &HashMap<AccountId, Vec<RegistrationRow>>,
    window: ReportWindow,
    today: Day,
) -> FrequencySlot {
    let elapsed = window.elapsed(today);
    let mut per_account = HashMap::new();
    let mut regs_to_have_per_dow = HashMap::new();
    let (mut expected, mut registered) = (0, 0);

    for (account, timeline) in timelines {
        let mut ledger = match elapsed {
            Some(elapsed) => weekday_ledger(timeline, elapsed),
            None => AccountLedger::default(),
        };
        if let Some(account_rows) = rows.get(account) {
            fold_registrations(&mut ledger, account_rows);
        }
        let totals = &ledger.totals;
        expected += totals.expected_days;
        registered += totals.registered_days;
        per_account.insert(
            account.clone(),
            FrequencyFigures::from_counts(totals.expected_days, totals.registered_days),
        );
        regs_to_have_per_dow.insert(account.clone(), ledger.regs_to_have_per_dow);
    }

    FrequencySlot {
        per_account,
        regs_to_have_per_dow,
        totals: FrequencyFigures::from_counts(expected, registered),
    }
}

/// Frequency report for the requested window plus its trend.
pub async fn frequency_report(
    repo: &dyn FullRepository,
    request: &ReportRequest,
    config: &ReportConfig,
) -> ReportResult<FrequencyReport> {
    config.validate()?;
    let req = request.normalize()?;
    let timelines = fetch::registration_days(repo, &req.accounts, req.window).await?;
    let missing = fetch::without_settings(&req.accounts, &timelines);
    let accounts: Vec<AccountId> = req
        .accounts
        .iter()
        .filter(|a| timelines.contains_key(*a))
        .cloned()
        .collect();
    debug!(
        "frequency_report: window={} accounts={} without_settings={}",
        req.window,
        accounts.len(),
        missing.len()
    );

    let today = req.today;
    let (accounts_ref, timelines_ref) = (&accounts, &timelines);
    let slot = move |window: ReportWindow| async move {
        let rows =
            fetch::registrations_by_account(repo, accounts_ref, window.elapsed(today)).await?;
        Ok::<_, ReportError>(compute_frequency(timelines_ref, &rows, window, today))
    };

    let (mut current, trend) = futures::try_join!(
        slot(req.window),
        build_trend(req.window, req.period, config.trend_periods, slot)
    )?;

    let accounts = accounts
        .into_iter()
        .map(|account| {
            let figures = current
                .per_account
                .remove(&account)
                .unwrap_or_else(|| FrequencyFigures::from_counts(0, 0));
            let trend = trend
                .iter()
                .map(|slot| {
                    let point = slot.result.per_account.get(&account);
                    FrequencyTrendPoint {
                        period_label: slot.period_label.clone(),
                        on_target: point.map_or(false, |p| p.on_target),
                        percentage: point.map_or(INSUFFICIENT, |p| p.frequency),
                    }
                })
                .collect();
            AccountFrequency {
                regs_to_have_per_dow: current
                    .regs_to_have_per_dow
                    .remove(&account)
                    .unwrap_or_default(),
                account_id: account,
                figures,
                trend,
            }
        })
        .collect();

    Ok(FrequencyReport {
        meta: req.meta(missing),
        totals: current.totals,
        accounts,
    })
}

#[cfg(test)]
#[path = "frequency_tests.rs"]
mod frequency_tests;

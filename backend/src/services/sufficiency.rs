//! Data-sufficiency gating of the waste and improvement reports.

use log::warn;
use std::collections::{HashMap, HashSet};

use crate::db::repository::settings::TimelineMap;
use crate::engine::{weekday_ledger, SufficiencyGate};
use crate::models::{AccountId, ReportWindow, SettingsTimeline, WeekdaySet};

/// Registration days expected of an account over `elapsed`.
///
/// Accounts without a registration-days timeline are expected to register
/// every day.
pub fn expected_registration_days(
    timeline: Option<&SettingsTimeline<WeekdaySet>>,
    elapsed: Option<ReportWindow>,
) -> u32 {
    let Some(elapsed) = elapsed else {
        return 0;
    };
    match timeline {
        Some(timeline) => weekday_ledger(timeline, elapsed).totals.expected_days,
        None => elapsed.total_days(),
    }
}

/// Which accounts may be reported for one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub sufficient: HashSet<AccountId>,
    pub quorum_met: bool,
}

impl GateOutcome {
    /// Whether `account` gets real numbers.
    pub fn reports(&self, account: &AccountId) -> bool {
        self.quorum_met && self.sufficient.contains(account)
    }
}

/// Gate `accounts` for one window.
///
/// `requested` is the number of accounts in the request, including those
/// without settings, which can never be sufficient.
pub fn evaluate(
    gate: &SufficiencyGate,
    accounts: &[AccountId],
    requested: usize,
    registration_days: &TimelineMap<WeekdaySet>,
    day_counts: &HashMap<AccountId, u32>,
    elapsed: Option<ReportWindow>,
) -> GateOutcome {
    let sufficient: HashSet<AccountId> = accounts
        .iter()
        .filter(|account| {
            let expected = expected_registration_days(registration_days.get(*account), elapsed);
            let registered = day_counts.get(*account).copied().unwrap_or(0);
            gate.account_is_sufficient(expected, registered)
        })
        .cloned()
        .collect();

    let quorum_met = gate.quorum_met(sufficient.len(), requested);
    if !quorum_met {
        warn!(
            "Only {} of {} requested accounts have enough data{}",
            sufficient.len(),
            requested,
            elapsed.map(|w| format!(" in {}", w)).unwrap_or_default()
        );
    }
    GateOutcome {
        sufficient,
        quorum_met,
    }
}

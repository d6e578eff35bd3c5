//! Ratio, cost and forecast arithmetic over aggregated totals.
//!
//! Everything here is a pure function. Rounding is half away from zero,
//! which is what [`f64::round`] does.

use serde::{Deserialize, Serialize};

use crate::models::{Day, ReportWindow};

/// Frequency reported for an account that met its expected registrations.
pub const ON_TARGET_SCORE: i64 = 150;

/// Sentinel for values that cannot be reported with the data available.
pub const INSUFFICIENT: i64 = -1;

/// On-target flag with the frequency score that goes with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnTargetValue {
    pub on_target: bool,
    pub frequency: i64,
}

/// Score registered days against expected days.
///
/// A met target scores [`ON_TARGET_SCORE`] rather than 100. Without any
/// expected day there is nothing to score and the result is
/// [`INSUFFICIENT`].
pub fn on_target_and_value(expected_days: u32, registered_days: u32) -> OnTargetValue {
    if expected_days == 0 {
        return OnTargetValue {
            on_target: false,
            frequency: INSUFFICIENT,
        };
    }
    if registered_days >= expected_days {
        return OnTargetValue {
            on_target: true,
            frequency: ON_TARGET_SCORE,
        };
    }
    OnTargetValue {
        on_target: false,
        frequency: round(registered_days as f64 / expected_days as f64 * 100.0),
    }
}

/// Round half away from zero to an integer.
pub fn round(value: f64) -> i64 {
    value.round() as i64
}

/// `round(part / whole * 100)`, or [`INSUFFICIENT`] when `whole` is not positive.
pub fn percentage(part: f64, whole: f64) -> i64 {
    if whole <= 0.0 {
        return INSUFFICIENT;
    }
    round(part / whole * 100.0)
}

/// Expected cost of a window.
///
/// A closed window is priced in full. An open window is prorated to the days
/// elapsed so far and rounded.
pub fn expected_cost(expected_weight: f64, avg_cost: f64, window: ReportWindow, today: Day) -> f64 {
    if window.is_closed(today) {
        return expected_weight * avg_cost;
    }
    let total = window.total_days() as f64;
    let elapsed = window.days_until(today) as f64;
    (expected_weight / total * elapsed * avg_cost).round()
}

/// Savings still available: `max(0, round(expected - actual))`.
pub fn improvement_cost(expected_cost: f64, actual_cost: f64) -> f64 {
    (expected_cost - actual_cost).round().max(0.0)
}

/// Extrapolate a value measured over the elapsed part of an open window to the
/// whole window. `None` for a closed window.
///
/// When no day has elapsed yet the value is returned unchanged.
pub fn forecast(value: f64, window: ReportWindow, today: Day) -> Option<f64> {
    if window.is_closed(today) {
        return None;
    }
    let elapsed = window.days_until(today);
    if elapsed == 0 {
        return Some(value);
    }
    let total = window.total_days();
    let remaining = total.saturating_sub(elapsed) as f64;
    Some((value + value / elapsed as f64 * remaining).round())
}

/// Data-sufficiency policy shared by the waste and improvement reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SufficiencyGate {
    /// Share of expected registration days an account must have registered.
    pub threshold: f64,
    /// Share of requested accounts that must be sufficient.
    pub quorum: f64,
}

impl Default for SufficiencyGate {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            quorum: 0.7,
        }
    }
}

// Guards ratios like 0.7 * 10 against representation error.
const EPS: f64 = 1e-9;

impl SufficiencyGate {
    pub fn new(threshold: f64, quorum: f64) -> Self {
        Self { threshold, quorum }
    }

    /// An account with no expected registration day is never sufficient.
    pub fn account_is_sufficient(&self, expected_days: u32, registered_days: u32) -> bool {
        expected_days > 0 && registered_days as f64 + EPS >= self.threshold * expected_days as f64
    }

    pub fn quorum_met(&self, sufficient: usize, requested: usize) -> bool {
        requested > 0 && sufficient as f64 + EPS >= self.quorum * requested as f64
    }
}

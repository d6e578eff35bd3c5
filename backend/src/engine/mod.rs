//! Pure computation core of the reports.
//!
//! The stages run in order for one account and one window:
//! [`partition`] splits the window along the settings timeline, [`weekdays`]
//! and [`expected`] turn each sub-interval into expected values, [`actuals`]
//! folds registrations into the resulting [`AccountLedger`], and [`ratios`]
//! derives the reported numbers. [`trend`] repeats the whole pipeline for the
//! trailing periods.
//!
//! Nothing in here performs I/O.

pub mod actuals;
pub mod expected;
pub mod partition;
pub mod ratios;
pub mod trend;
pub mod weekdays;

pub use actuals::{back_fill, fold_registrations, FoldSummary};
pub use expected::{weekday_ledger, weight_ledger, AccountLedger, ExpectedTotals, SubintervalTally};
pub use partition::{partition, Subinterval};
pub use ratios::{
    expected_cost, forecast, improvement_cost, on_target_and_value, percentage, OnTargetValue,
    SufficiencyGate, INSUFFICIENT, ON_TARGET_SCORE,
};
pub use trend::{build_trend, trailing_windows, TrendSlot, TREND_PERIODS};
pub use weekdays::{count_weekdays, WeekdayCounts};

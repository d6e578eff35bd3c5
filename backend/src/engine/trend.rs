//! Trailing-period trends.

use futures::future::try_join_all;
use serde::Serialize;
use std::future::Future;

use crate::models::{PeriodUnit, ReportWindow};

/// Default number of trailing periods in a trend.
pub const TREND_PERIODS: u32 = 5;

/// One trailing period of a trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSlot<T> {
    /// How many units this slot lies before the requested window.
    pub offset: u32,
    pub window: ReportWindow,
    pub period_label: String,
    pub result: T,
}

/// Windows of the `periods` units preceding `window`, oldest first.
///
/// Periods that would start before chrono's earliest date are left out.
pub fn trailing_windows(window: ReportWindow, unit: PeriodUnit, periods: u32) -> Vec<(u32, ReportWindow)> {
    (1..=periods)
        .rev()
        .filter_map(|n| window.shifted_back(unit, n).map(|shifted| (n, shifted)))
        .collect()
}

/// Run `compute` for each trailing period of `window` concurrently.
///
/// Slots are shifted from the requested window, not from today. Any failing
/// slot fails the whole trend.
pub async fn build_trend<T, E, F, Fut>(
    window: ReportWindow,
    unit: PeriodUnit,
    periods: u32,
    compute: F,
) -> Result<Vec<TrendSlot<T>>, E>
where
    F: Fn(ReportWindow) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let slots = trailing_windows(window, unit, periods)
        .into_iter()
        .map(|(offset, shifted)| {
            let pending = compute(shifted);
            async move {
                let result = pending.await?;
                Ok::<_, E>(TrendSlot {
                    offset,
                    window: shifted,
                    period_label: unit.label(shifted.start),
                    result,
                })
            }
        });
    try_join_all(slots).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Day;

    fn day(s: &str) -> Day {
        s.parse().unwrap()
    }

    #[test]
    fn test_trailing_weeks_oldest_first() {
        let w = ReportWindow::new(day("2018-08-13"), day("2018-08-19"));
        let windows = trailing_windows(w, PeriodUnit::Week, 5);
        assert_eq!(windows.len(), 5);
        assert_eq!(windows[0], (5, ReportWindow::new(day("2018-07-09"), day("2018-07-15"))));
        assert_eq!(windows[4], (1, ReportWindow::new(day("2018-08-06"), day("2018-08-12"))));
    }

    #[test]
    fn test_slots_before_the_calendar_are_left_out() {
        let first = Day::from(chrono::NaiveDate::MIN).add_days(7);
        let w = ReportWindow::new(first, first.add_days(6));
        let windows = trailing_windows(w, PeriodUnit::Month, 5);
        assert!(windows.is_empty());
    }

    #[tokio::test]
    async fn test_build_trend_labels_and_order() {
        let w = ReportWindow::new(day("2018-06-01"), day("2018-06-30"));
        let trend = build_trend(w, PeriodUnit::Month, 3, |shifted| async move {
            Ok::<_, String>(shifted.total_days())
        })
        .await
        .unwrap();

        let labels: Vec<&str> = trend.iter().map(|s| s.period_label.as_str()).collect();
        assert_eq!(labels, vec!["2018-03", "2018-04", "2018-05"]);
        let days: Vec<u32> = trend.iter().map(|s| s.result).collect();
        assert_eq!(days, vec![31, 30, 31]);
    }

    #[tokio::test]
    async fn test_build_trend_propagates_failure() {
        let w = ReportWindow::new(day("2018-08-13"), day("2018-08-19"));
        let result = build_trend(w, PeriodUnit::Week, 5, |shifted| async move {
            if shifted.start == day("2018-07-23") {
                Err("storage down".to_string())
            } else {
                Ok(())
            }
        })
        .await;
        assert_eq!(result.unwrap_err(), "storage down");
    }

    #[tokio::test]
    async fn test_zero_periods_is_empty() {
        let w = ReportWindow::new(day("2018-08-13"), day("2018-08-19"));
        let trend = build_trend(w, PeriodUnit::Year, 0, |_| async { Ok::<_, String>(1) })
            .await
            .unwrap();
        assert!(trend.is_empty());
    }
}

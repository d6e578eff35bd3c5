//! End-to-end report computations against the in-memory repository.

use fw_reports::models::{AccountId, PeriodUnit, ReportWindow};
use fw_reports::services::{
    frequency_report, improvement_report, waste_report, ReportConfig, ReportRequest,
};

mod support;

use support::{changing_weekdays, day, daily_rows, seeded_repository, week_33};

fn closed_request(accounts: &[&str]) -> ReportRequest {
    ReportRequest::new(accounts[0], day("2018-09-01"))
        .with_accounts(accounts.iter().copied())
        .with_window(week_33().start, week_33().end)
}

// =========================================================
// Frequency
// =========================================================

#[tokio::test]
async fn test_frequency_for_three_accounts() {
    let repo = seeded_repository();
    let request = closed_request(&["kitchen-a", "kitchen-b", "kitchen-c"]);

    let report = frequency_report(&repo, &request, &ReportConfig::default())
        .await
        .unwrap();

    let scores: Vec<i64> = report.accounts.iter().map(|a| a.figures.frequency).collect();
    assert_eq!(scores, vec![150, 150, 0]);
    assert_eq!(report.accounts[0].figures.expected_days, 3);
    assert_eq!(report.totals.expected_days, 17);
    assert_eq!(report.totals.registered_days, 10);
    assert_eq!(report.totals.frequency, 59);
}

#[tokio::test]
async fn test_frequency_in_open_week_counts_elapsed_days() {
    let repo = seeded_repository();
    let request = ReportRequest::new("kitchen-a", day("2018-08-15"))
        .with_accounts(["kitchen-a", "kitchen-c"]);

    let report = frequency_report(&repo, &request, &ReportConfig::default())
        .await
        .unwrap();

    assert!(!report.meta.closed);
    assert_eq!(report.meta.days_until_now, 3);
    assert_eq!(report.meta.start, day("2018-08-13"));
    let a = &report.accounts[0];
    assert_eq!(a.figures.expected_days, 2);
    assert_eq!(a.figures.frequency, 150);
    assert_eq!(report.accounts[1].figures.expected_days, 3);
}

#[tokio::test]
async fn test_frequency_over_settings_changes() {
    let repo = seeded_repository();
    repo.set_registration_days("kitchen-d", changing_weekdays());
    let request = ReportRequest::new("kitchen-d", day("2018-10-01"))
        .with_window(day("2018-08-05"), day("2018-09-03"));

    let report = frequency_report(&repo, &request, &ReportConfig::default())
        .await
        .unwrap();

    let d = &report.accounts[0];
    assert_eq!(d.figures.expected_days, 17);
    assert_eq!(d.regs_to_have_per_dow.len(), 4);
    assert_eq!(d.figures.frequency, 0);
}

#[tokio::test]
async fn test_monthly_trend_labels() {
    let repo = seeded_repository();
    let request = ReportRequest::new("kitchen-b", day("2018-09-01"))
        .with_window(day("2018-08-01"), day("2018-08-31"))
        .with_period(PeriodUnit::Month);

    let report = frequency_report(&repo, &request, &ReportConfig::default())
        .await
        .unwrap();

    let labels: Vec<&str> = report.accounts[0]
        .trend
        .iter()
        .map(|p| p.period_label.as_str())
        .collect();
    assert_eq!(labels, vec!["2018-03", "2018-04", "2018-05", "2018-06", "2018-07"]);
}

// =========================================================
// Waste
// =========================================================

#[tokio::test]
async fn test_waste_for_registering_accounts() {
    let repo = seeded_repository();
    let request = closed_request(&["kitchen-a", "kitchen-b"]);

    let report = waste_report(&repo, &request, &ReportConfig::default())
        .await
        .unwrap();

    assert!(report.quorum_met);
    let a = &report.accounts[0].figures;
    assert_eq!(a.actual_amount, 5600.0);
    assert_eq!(a.percentage, 80);
    let b = &report.accounts[1].figures;
    assert_eq!(b.percentage, 100);
    assert!(b.on_target);
    assert_eq!(report.totals.expected_amount, 21000.0);
    assert_eq!(report.totals.percentage, 93);
    assert_eq!(report.totals.forecasted_amount, None);
}

#[tokio::test]
async fn test_silent_account_breaks_the_quorum() {
    let repo = seeded_repository();
    let request = closed_request(&["kitchen-a", "kitchen-b", "kitchen-c"]);

    let report = waste_report(&repo, &request, &ReportConfig::default())
        .await
        .unwrap();

    // 2 of 3 accounts is below the 70% quorum
    assert!(!report.quorum_met);
    assert!(report.accounts.iter().all(|a| a.figures.percentage == -1));
    assert_eq!(report.totals.actual_amount, -1.0);

    let lenient = ReportConfig {
        account_quorum: 0.6,
        ..Default::default()
    };
    let report = waste_report(&repo, &request, &lenient).await.unwrap();
    assert!(report.quorum_met);
    assert_eq!(report.accounts[2].figures.percentage, -1);
    assert_eq!(report.accounts[0].figures.percentage, 80);
}

#[tokio::test]
async fn test_trend_degrades_per_slot() {
    let repo = seeded_repository();
    let week_32 = ReportWindow::new(day("2018-08-06"), day("2018-08-12"));
    repo.add_registrations(daily_rows("kitchen-a", week_32, 700.0, 1400.0));
    repo.add_registrations(daily_rows("kitchen-b", week_32, 2000.0, 3000.0));
    let request = closed_request(&["kitchen-a", "kitchen-b"]);

    let report = waste_report(&repo, &request, &ReportConfig::default())
        .await
        .unwrap();

    let trend = &report.accounts[0].trend;
    assert_eq!(trend[4].period_label, "32");
    assert_eq!(trend[4].percentage, 70);
    assert_eq!(trend[3].percentage, -1);
    assert_eq!(trend[3].max_cost, 7000.0);
}

// =========================================================
// Improvements
// =========================================================

#[tokio::test]
async fn test_improvements_for_registering_accounts() {
    let repo = seeded_repository();
    let request = closed_request(&["kitchen-a", "kitchen-b"]);

    let report = improvement_report(&repo, &request, &ReportConfig::default())
        .await
        .unwrap();

    let a = &report.accounts[0];
    assert_eq!(a.account_id, AccountId::from("kitchen-a"));
    assert_eq!(a.figures.avg_cost, 2.0);
    assert_eq!(a.figures.expected_cost, 14000.0);
    assert_eq!(a.figures.improvement_cost, 2800.0);

    let b = &report.accounts[1];
    assert_eq!(b.figures.avg_cost, 1.5);
    assert_eq!(b.figures.improvement_cost, 0.0);
    assert!(b.figures.on_target);

    assert_eq!(report.totals.expected_cost, 35000.0);
    assert_eq!(report.totals.actual_cost, 32200.0);
    assert_eq!(report.totals.improvement_cost, 2800.0);
    assert!(report.totals.forecasted_cost.is_none());
}

#[tokio::test]
async fn test_improvements_open_week_has_forecast() {
    let repo = seeded_repository();
    let request = ReportRequest::new("kitchen-a", day("2018-08-15"))
        .with_accounts(["kitchen-a", "kitchen-b"]);

    let report = improvement_report(&repo, &request, &ReportConfig::default())
        .await
        .unwrap();

    // three elapsed days at 1000 g/day and 2.0 per gram
    let a = &report.accounts[0].figures;
    assert_eq!(a.expected_cost, 6000.0);
    assert_eq!(a.actual_cost, 4800.0);
    assert_eq!(a.improvement_cost, 1200.0);
    assert_eq!(a.forecasted_cost, Some(2800.0));
}

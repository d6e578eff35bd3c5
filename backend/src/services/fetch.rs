//! Collaborator calls shared by the report services.

use std::collections::HashMap;

use super::error::{ReportError, ReportResult};
use crate::db::repository::settings::TimelineMap;
use crate::db::{FullRepository, RegistrationRepository, SettingsRepository};
use crate::models::{
    AccountId, RegistrationRow, ReportWindow, SettingsKind, WeekdaySet, WeeklyAmount,
};

/// Registration-days timelines; none at all is [`ReportError::NoSettings`].
pub async fn registration_days(
    repo: &dyn FullRepository,
    accounts: &[AccountId],
    window: ReportWindow,
) -> ReportResult<TimelineMap<WeekdaySet>> {
    repo.fetch_registration_days(accounts)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                ReportError::no_settings(SettingsKind::RegistrationDays.as_str(), accounts)
            } else {
                ReportError::storage(e, accounts, window)
            }
        })
}

/// Registration-days timelines where missing ones are simply absent.
pub async fn optional_registration_days(
    repo: &dyn FullRepository,
    accounts: &[AccountId],
    window: ReportWindow,
) -> ReportResult<TimelineMap<WeekdaySet>> {
    match repo.fetch_registration_days(accounts).await {
        Ok(map) => Ok(map),
        Err(e) if e.is_not_found() => Ok(HashMap::new()),
        Err(e) => Err(ReportError::storage(e, accounts, window)),
    }
}

/// Expected-waste timelines; none at all is [`ReportError::NoSettings`].
pub async fn expected_waste(
    repo: &dyn FullRepository,
    accounts: &[AccountId],
    window: ReportWindow,
) -> ReportResult<TimelineMap<WeeklyAmount>> {
    repo.fetch_expected_waste(accounts)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                ReportError::no_settings(SettingsKind::ExpectedWeeklyWaste.as_str(), accounts)
            } else {
                ReportError::storage(e, accounts, window)
            }
        })
}

/// Registration rows grouped by account. An empty window yields no rows
/// without touching storage.
pub async fn registrations_by_account(
    repo: &dyn FullRepository,
    accounts: &[AccountId],
    window: Option<ReportWindow>,
) -> ReportResult<HashMap<AccountId, Vec<RegistrationRow>>> {
    let Some(window) = window else {
        return Ok(HashMap::new());
    };
    let rows = repo
        .fetch_registrations(accounts, window)
        .await
        .map_err(|e| ReportError::storage(e, accounts, window))?;

    let mut grouped: HashMap<AccountId, Vec<RegistrationRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.customer_id.clone()).or_default().push(row);
    }
    Ok(grouped)
}

/// Days with at least one registration per account.
pub async fn registration_day_counts(
    repo: &dyn FullRepository,
    accounts: &[AccountId],
    window: Option<ReportWindow>,
) -> ReportResult<HashMap<AccountId, u32>> {
    let Some(window) = window else {
        return Ok(HashMap::new());
    };
    repo.count_registration_days(accounts, window)
        .await
        .map_err(|e| ReportError::storage(e, accounts, window))
}

/// Requested accounts missing from `timelines`, in request order.
pub fn without_settings<V>(accounts: &[AccountId], timelines: &TimelineMap<V>) -> Vec<AccountId> {
    accounts
        .iter()
        .filter(|a| !timelines.contains_key(*a))
        .cloned()
        .collect()
}

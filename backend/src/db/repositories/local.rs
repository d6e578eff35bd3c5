//! In-memory local repository implementation.
//!
//! Suitable for unit tests and local development: settings and registrations
//! live in maps behind a lock, so every test gets fast, isolated storage.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::db::repository::settings::TimelineMap;
use crate::db::repository::*;
use crate::models::{
    AccountId, Day, RegistrationRow, ReportWindow, SettingsEntry, SettingsKind, SettingsTimeline,
    WeekdaySet, WeeklyAmount,
};

/// In-memory local repository.
///
/// Clones share the same storage.
///
/// # Example
/// ```
/// use fw_reports::db::repositories::LocalRepository;
/// use fw_reports::models::{SettingsTimeline, WeekdaySet};
///
/// let repo = LocalRepository::new();
/// repo.set_registration_days("acc-1", SettingsTimeline::constant(WeekdaySet::EVERY_DAY));
/// assert_eq!(repo.account_count(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    registration_days: HashMap<AccountId, BTreeMap<Day, WeekdaySet>>,
    expected_waste: HashMap<AccountId, BTreeMap<Day, WeeklyAmount>>,
    registrations: Vec<RegistrationRow>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            registration_days: HashMap::new(),
            expected_waste: HashMap::new(),
            registrations: Vec::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Replace the registration-days timeline of an account.
    pub fn set_registration_days(
        &self,
        account: impl Into<String>,
        timeline: SettingsTimeline<WeekdaySet>,
    ) {
        let entries = timeline
            .entries()
            .iter()
            .map(|e| (e.effective_from, e.value))
            .collect();
        self.data
            .write()
            .registration_days
            .insert(AccountId::new(account), entries);
    }

    /// Replace the expected-waste timeline of an account.
    pub fn set_expected_waste(
        &self,
        account: impl Into<String>,
        timeline: SettingsTimeline<WeeklyAmount>,
    ) {
        let entries = timeline
            .entries()
            .iter()
            .map(|e| (e.effective_from, e.value))
            .collect();
        self.data
            .write()
            .expected_waste
            .insert(AccountId::new(account), entries);
    }

    /// Append registration rows.
    pub fn add_registrations(&self, rows: impl IntoIterator<Item = RegistrationRow>) {
        self.data.write().registrations.extend(rows);
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data, keeping the health flag.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Number of accounts with any settings.
    pub fn account_count(&self) -> usize {
        let data = self.data.read();
        data.registration_days
            .keys()
            .chain(data.expected_waste.keys())
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn registration_count(&self) -> usize {
        self.data.read().registrations.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect the timelines of `accounts` out of `store`, failing when none has one.
fn collect_timelines<V: Copy>(
    store: &HashMap<AccountId, BTreeMap<Day, V>>,
    accounts: &[AccountId],
    kind: SettingsKind,
    operation: &str,
) -> RepositoryResult<TimelineMap<V>> {
    let mut out = HashMap::new();
    for account in accounts {
        let Some(entries) = store.get(account) else {
            continue;
        };
        let entries: Vec<_> = entries
            .iter()
            .map(|(day, value)| SettingsEntry::new(*day, *value))
            .collect();
        if entries.is_empty() {
            continue;
        }
        let timeline = SettingsTimeline::new(entries).map_err(|e| {
            RepositoryError::validation_with_context(
                e.to_string(),
                ErrorContext::new(operation)
                    .with_entity(kind.as_str())
                    .with_accounts(std::slice::from_ref(account)),
            )
        })?;
        out.insert(account.clone(), timeline);
    }
    if out.is_empty() {
        return Err(RepositoryError::not_found_with_context(
            "None of the selected accounts have settings",
            ErrorContext::new(operation)
                .with_entity(kind.as_str())
                .with_accounts(accounts),
        ));
    }
    Ok(out)
}

#[async_trait]
impl SettingsRepository for LocalRepository {
    async fn fetch_registration_days(
        &self,
        accounts: &[AccountId],
    ) -> RepositoryResult<TimelineMap<WeekdaySet>> {
        self.check_health("fetch_registration_days")?;
        let data = self.data.read();
        collect_timelines(
            &data.registration_days,
            accounts,
            SettingsKind::RegistrationDays,
            "fetch_registration_days",
        )
    }

    async fn fetch_expected_waste(
        &self,
        accounts: &[AccountId],
    ) -> RepositoryResult<TimelineMap<WeeklyAmount>> {
        self.check_health("fetch_expected_waste")?;
        let data = self.data.read();
        collect_timelines(
            &data.expected_waste,
            accounts,
            SettingsKind::ExpectedWeeklyWaste,
            "fetch_expected_waste",
        )
    }

    async fn store_registration_days(
        &self,
        account: &AccountId,
        entry: SettingsEntry<WeekdaySet>,
    ) -> RepositoryResult<()> {
        self.check_health("store_registration_days")?;
        self.data
            .write()
            .registration_days
            .entry(account.clone())
            .or_default()
            .insert(entry.effective_from, entry.value);
        Ok(())
    }

    async fn store_expected_waste(
        &self,
        account: &AccountId,
        entry: SettingsEntry<WeeklyAmount>,
    ) -> RepositoryResult<()> {
        self.check_health("store_expected_waste")?;
        self.data
            .write()
            .expected_waste
            .entry(account.clone())
            .or_default()
            .insert(entry.effective_from, entry.value);
        Ok(())
    }
}

#[async_trait]
impl RegistrationRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn fetch_registrations(
        &self,
        accounts: &[AccountId],
        window: ReportWindow,
    ) -> RepositoryResult<Vec<RegistrationRow>> {
        self.check_health("fetch_registrations")?;
        let data = self.data.read();
        let mut rows: Vec<RegistrationRow> = data
            .registrations
            .iter()
            .filter(|r| window.contains(r.date) && accounts.contains(&r.customer_id))
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }

    async fn count_registration_days(
        &self,
        accounts: &[AccountId],
        window: ReportWindow,
    ) -> RepositoryResult<HashMap<AccountId, u32>> {
        self.check_health("count_registration_days")?;
        let data = self.data.read();
        let mut days: HashMap<AccountId, BTreeSet<Day>> = HashMap::new();
        for row in &data.registrations {
            if window.contains(row.date) && accounts.contains(&row.customer_id) {
                days.entry(row.customer_id.clone())
                    .or_default()
                    .insert(row.date);
            }
        }
        Ok(days
            .into_iter()
            .map(|(account, dates)| (account, dates.len() as u32))
            .collect())
    }

    async fn store_registrations(&self, rows: &[RegistrationRow]) -> RepositoryResult<usize> {
        self.check_health("store_registrations")?;
        self.data.write().registrations.extend_from_slice(rows);
        Ok(rows.len())
    }
}

//! Settings timeline repository trait.

use async_trait::async_trait;
use std::collections::HashMap;

use super::error::RepositoryResult;
use crate::models::{AccountId, SettingsEntry, SettingsTimeline, WeekdaySet, WeeklyAmount};

/// Timelines keyed by account.
pub type TimelineMap<V> = HashMap<AccountId, SettingsTimeline<V>>;

/// Access to the per-account settings history.
///
/// Fetches return only the accounts that have at least one entry. When none
/// of the requested accounts has any, they fail with
/// [`RepositoryError::NotFound`](super::RepositoryError::NotFound).
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Weekdays each account is expected to register on.
    async fn fetch_registration_days(
        &self,
        accounts: &[AccountId],
    ) -> RepositoryResult<TimelineMap<WeekdaySet>>;

    /// Expected weekly waste amount of each account.
    async fn fetch_expected_waste(
        &self,
        accounts: &[AccountId],
    ) -> RepositoryResult<TimelineMap<WeeklyAmount>>;

    /// Insert or replace the registration-days entry of `account` at its date.
    async fn store_registration_days(
        &self,
        account: &AccountId,
        entry: SettingsEntry<WeekdaySet>,
    ) -> RepositoryResult<()>;

    /// Insert or replace the expected-waste entry of `account` at its date.
    async fn store_expected_waste(
        &self,
        account: &AccountId,
        entry: SettingsEntry<WeeklyAmount>,
    ) -> RepositoryResult<()>;
}

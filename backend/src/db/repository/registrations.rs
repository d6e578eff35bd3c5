//! Registration facts repository trait.

use async_trait::async_trait;
use std::collections::HashMap;

use super::error::RepositoryResult;
use crate::models::{AccountId, RegistrationRow, ReportWindow};

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Check if the storage backend is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Rows of `accounts` dated inside `window`, ordered by date.
    ///
    /// An empty result is not an error.
    async fn fetch_registrations(
        &self,
        accounts: &[AccountId],
        window: ReportWindow,
    ) -> RepositoryResult<Vec<RegistrationRow>>;

    /// Number of distinct dates with at least one registration, per account.
    ///
    /// Accounts without registrations are absent from the map.
    async fn count_registration_days(
        &self,
        accounts: &[AccountId],
        window: ReportWindow,
    ) -> RepositoryResult<HashMap<AccountId, u32>>;

    /// Append rows and return how many were stored.
    async fn store_registrations(&self, rows: &[RegistrationRow]) -> RepositoryResult<usize>;
}

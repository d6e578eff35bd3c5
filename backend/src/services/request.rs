//! Report request normalisation.

use serde::Serialize;

use super::error::{ReportError, ReportResult};
use crate::models::{AccountId, Day, PeriodUnit, ReportWindow, SUPPORTED_YEARS};

/// Report parameters as received from the caller, already authorised.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Account the caller acts as.
    pub requesting_account: AccountId,
    pub accounts: Vec<AccountId>,
    pub start: Option<Day>,
    pub end: Option<Day>,
    pub period: PeriodUnit,
    /// Reference day for open/closed decisions.
    pub today: Day,
}

/// Request with every default resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRequest {
    pub accounts: Vec<AccountId>,
    pub window: ReportWindow,
    pub period: PeriodUnit,
    pub today: Day,
}

impl ReportRequest {
    pub fn new(requesting_account: impl Into<String>, today: Day) -> Self {
        Self {
            requesting_account: AccountId::new(requesting_account),
            accounts: Vec::new(),
            start: None,
            end: None,
            period: PeriodUnit::default(),
            today,
        }
    }

    pub fn with_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accounts = accounts.into_iter().map(AccountId::new).collect();
        self
    }

    pub fn with_window(mut self, start: Day, end: Day) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_period(mut self, period: PeriodUnit) -> Self {
        self.period = period;
        self
    }

    /// Resolve defaults.
    ///
    /// - Blank ids are dropped and duplicates removed, first occurrence kept.
    /// - No accounts means the requesting account.
    /// - Without dates the window is the current period containing today; with
    ///   a single date it is the period containing that date.
    /// - Reversed dates are swapped.
    /// - Windows outside [`SUPPORTED_YEARS`] are rejected.
    pub fn normalize(&self) -> ReportResult<NormalizedRequest> {
        let mut accounts: Vec<AccountId> = Vec::with_capacity(self.accounts.len());
        for account in &self.accounts {
            let trimmed = account.as_str().trim();
            if trimmed.is_empty() || accounts.iter().any(|a| a.as_str() == trimmed) {
                continue;
            }
            accounts.push(AccountId::from(trimmed));
        }
        if accounts.is_empty() {
            let own = self.requesting_account.as_str().trim();
            if own.is_empty() {
                return Err(ReportError::InvalidRequest(
                    "no account to report on".to_string(),
                ));
            }
            accounts.push(AccountId::from(own));
        }

        let window = match (self.start, self.end) {
            (Some(start), Some(end)) => ReportWindow::new(start, end),
            (Some(day), None) | (None, Some(day)) => self.period.current_window(day),
            (None, None) => self.period.current_window(self.today),
        };
        if !window.start.is_supported() || !window.end.is_supported() {
            return Err(ReportError::InvalidRequest(format!(
                "window {} is outside the years {}..={}",
                window,
                SUPPORTED_YEARS.start(),
                SUPPORTED_YEARS.end()
            )));
        }

        Ok(NormalizedRequest {
            accounts,
            window,
            period: self.period,
            today: self.today,
        })
    }
}

/// Window description shared by every report body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub period: PeriodUnit,
    pub start: Day,
    pub end: Day,
    pub closed: bool,
    pub total_days: u32,
    pub days_until_now: u32,
    pub accounts_without_settings: Vec<AccountId>,
}

impl NormalizedRequest {
    pub fn meta(&self, accounts_without_settings: Vec<AccountId>) -> ReportMeta {
        ReportMeta {
            period: self.period,
            start: self.window.start,
            end: self.window.end,
            closed: self.window.is_closed(self.today),
            total_days: self.window.total_days(),
            days_until_now: self.window.days_until(self.today),
            accounts_without_settings,
        }
    }
}

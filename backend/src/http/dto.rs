//! Data Transfer Objects for the HTTP API.
//!
//! Report bodies are the service types themselves; only the query string and
//! the health response live here.

use serde::{Deserialize, Serialize};

use crate::models::{Day, PeriodUnit};
use crate::services::ReportRequest;

/// Query string shared by the three report endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportQuery {
    /// Comma-separated account ids
    pub accounts: Option<String>,
    /// `YYYY-MM-DD`
    pub start: Option<String>,
    /// `YYYY-MM-DD`
    pub end: Option<String>,
    /// `week`, `month` or `year`
    pub period: Option<String>,
}

impl ReportQuery {
    /// Build the service request, rejecting unparsable dates and periods.
    pub fn into_request(self, requesting_account: &str, today: Day) -> Result<ReportRequest, String> {
        let mut request = ReportRequest::new(requesting_account, today);
        if let Some(accounts) = self.accounts.as_deref() {
            request = request.with_accounts(
                accounts
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty()),
            );
        }
        if let Some(period) = self.period.as_deref().filter(|p| !p.trim().is_empty()) {
            request = request.with_period(period.trim().parse::<PeriodUnit>().map_err(|e| e.to_string())?);
        }
        request.start = parse_day("start", self.start.as_deref())?;
        request.end = parse_day("end", self.end.as_deref())?;
        Ok(request)
    }
}

fn parse_day(name: &str, raw: Option<&str>) -> Result<Option<Day>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<Day>()
            .map(Some)
            .map_err(|e| format!("Invalid {} date {:?}: {}", name, s, e)),
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// API version
    pub version: String,
    /// Repository connectivity
    pub database: String,
}

//! HTTP handlers for the REST API.
//!
//! Each handler turns the query string into a [`ReportRequest`] and delegates
//! to the matching report service.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info};

use super::dto::{HealthResponse, ReportQuery};
use super::error::AppError;
use super::state::AppState;
use crate::db::RegistrationRepository;
use crate::models::Day;
use crate::services::{
    frequency_report, improvement_report, waste_report, FrequencyReport, ImprovementReport,
    ReportRequest, WasteReport,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Header carrying the account the upstream auth layer authenticated.
pub const ACCOUNT_HEADER: &str = "x-account-id";

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Verify the service is running and the repository is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Reports
// =============================================================================

fn report_request(headers: &HeaderMap, query: ReportQuery) -> Result<ReportRequest, AppError> {
    let account = headers
        .get(ACCOUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", ACCOUNT_HEADER)))?;
    let today = Day::from(Utc::now().date_naive());
    let request = query
        .into_request(account, today)
        .map_err(AppError::BadRequest)?;
    debug!(
        account,
        accounts = request.accounts.len(),
        period = request.period.as_str(),
        "report request"
    );
    Ok(request)
}

/// GET /v1/reports/frequency
pub async fn get_frequency(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> HandlerResult<FrequencyReport> {
    let request = report_request(&headers, query)?;
    let started = Instant::now();
    let report = frequency_report(state.repository.as_ref(), &request, &state.reports).await?;
    info!(
        accounts = report.accounts.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "frequency report"
    );
    Ok(Json(report))
}

/// GET /v1/reports/waste
pub async fn get_waste(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> HandlerResult<WasteReport> {
    let request = report_request(&headers, query)?;
    let started = Instant::now();
    let report = waste_report(state.repository.as_ref(), &request, &state.reports).await?;
    info!(
        accounts = report.accounts.len(),
        quorum_met = report.quorum_met,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "waste report"
    );
    Ok(Json(report))
}

/// GET /v1/reports/improvements
pub async fn get_improvements(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> HandlerResult<ImprovementReport> {
    let request = report_request(&headers, query)?;
    let started = Instant::now();
    let report = improvement_report(state.repository.as_ref(), &request, &state.reports).await?;
    info!(
        accounts = report.accounts.len(),
        quorum_met = report.quorum_met,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "improvement report"
    );
    Ok(Json(report))
}

//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let reports = Router::new()
        .route("/frequency", get(handlers::get_frequency))
        .route("/waste", get(handlers::get_waste))
        .route("/improvements", get(handlers::get_improvements));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1/reports", reports)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;
    use crate::models::{SettingsTimeline, WeekdaySet};

    fn app(repo: LocalRepository) -> Router {
        let repo = Arc::new(repo) as Arc<dyn FullRepository>;
        create_router(AppState::new(repo))
    }

    async fn get(app: Router, uri: &str, account: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(account) = account {
            request = request.header(handlers::ACCOUNT_HEADER, account);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app(LocalRepository::new()), "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_missing_account_header_is_bad_request() {
        let (status, body) = get(app(LocalRepository::new()), "/v1/reports/frequency", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_frequency_endpoint() {
        let repo = LocalRepository::new();
        repo.set_registration_days("a", SettingsTimeline::constant(WeekdaySet::EVERY_DAY));

        let (status, body) = get(
            app(repo),
            "/v1/reports/frequency?start=2018-08-13&end=2018-08-19",
            Some("a"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totals"]["expectedDays"], 7);
        assert_eq!(body["accounts"][0]["trend"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_no_settings_is_not_found() {
        let (status, body) = get(
            app(LocalRepository::new()),
            "/v1/reports/waste?accounts=x,y",
            Some("a"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains("x,y"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_server_error() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        let (status, _) = get(app(repo), "/v1/reports/improvements", Some("a")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_invalid_period_is_bad_request() {
        let (status, _) = get(
            app(LocalRepository::new()),
            "/v1/reports/frequency?period=fortnight",
            Some("a"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::ReportConfig;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Report tunables, fixed at startup
    pub reports: Arc<ReportConfig>,
}

impl AppState {
    /// Create a new application state with default report settings.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self::with_config(repository, ReportConfig::default())
    }

    pub fn with_config(repository: Arc<dyn FullRepository>, reports: ReportConfig) -> Self {
        Self {
            repository,
            reports: Arc::new(reports),
        }
    }
}

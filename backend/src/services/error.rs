//! Report error taxonomy.

use super::config::ConfigError;
use crate::db::RepositoryError;
use crate::models::{AccountId, ReportWindow};

pub type ReportResult<T> = Result<T, ReportError>;

/// Failures a report computation can surface.
///
/// Insufficient data is not an error: it shows up as `-1` values inside an
/// otherwise successful report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// None of the requested accounts has a settings timeline of the needed kind.
    #[error("None of the selected accounts have settings ({kind}): {}", .accounts.join(","))]
    NoSettings {
        kind: &'static str,
        accounts: Vec<String>,
    },

    /// Storage failure, tagged with the request scope that triggered it.
    #[error("Storage error for accounts [{}] in {window}: {source}", .accounts.join(","))]
    Storage {
        accounts: Vec<String>,
        window: ReportWindow,
        #[source]
        source: RepositoryError,
    },

    /// Storage failure that already names its accounts.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid report configuration: {0}")]
    Config(#[from] ConfigError),
}

impl ReportError {
    /// Wrap a repository failure for the given request scope.
    ///
    /// Errors that already carry account context pass through unchanged.
    pub fn storage(err: RepositoryError, accounts: &[AccountId], window: ReportWindow) -> Self {
        if !err.context().accounts.is_empty() {
            return Self::Repository(err);
        }
        Self::Storage {
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            window,
            source: err,
        }
    }

    pub fn no_settings(kind: &'static str, accounts: &[AccountId]) -> Self {
        Self::NoSettings {
            kind,
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Underlying repository error, if any.
    pub fn repository_error(&self) -> Option<&RepositoryError> {
        match self {
            Self::Storage { source, .. } => Some(source),
            Self::Repository(err) => Some(err),
            _ => None,
        }
    }
}

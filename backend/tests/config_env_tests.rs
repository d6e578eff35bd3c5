//! Configuration loading from files and the environment.

use std::io::Write;

use fw_reports::db::{RegistrationRepository, RepositoryConfig, RepositoryFactory, RepositoryType};
use fw_reports::services::{ConfigError, ReportConfig, MAX_TREND_PERIODS};

mod support;

use support::with_scoped_env;

#[test]
fn test_report_overrides_from_env() {
    let config = with_scoped_env(
        &[
            ("REPORT_SUFFICIENCY_THRESHOLD", Some("0.5")),
            ("REPORT_ACCOUNT_QUORUM", None),
            ("REPORT_TREND_PERIODS", Some("3")),
        ],
        ReportConfig::from_env,
    );
    assert_eq!(config.sufficiency_threshold, 0.5);
    assert_eq!(config.account_quorum, 0.7);
    assert_eq!(config.trend_periods, 3);
}

#[test]
fn test_unparsable_override_is_ignored() {
    let config = with_scoped_env(
        &[
            ("REPORT_SUFFICIENCY_THRESHOLD", None),
            ("REPORT_ACCOUNT_QUORUM", Some("most")),
            ("REPORT_TREND_PERIODS", None),
        ],
        ReportConfig::from_env,
    );
    assert_eq!(config, ReportConfig::default());
}

#[test]
fn test_oversized_trend_override_fails_validation() {
    let config = with_scoped_env(
        &[
            ("REPORT_SUFFICIENCY_THRESHOLD", None),
            ("REPORT_ACCOUNT_QUORUM", None),
            ("REPORT_TREND_PERIODS", Some("400000000")),
        ],
        ReportConfig::from_env,
    );
    assert_eq!(config.trend_periods, 400_000_000);
    assert_eq!(
        config.validate(),
        Err(ConfigError::TooManyTrendPeriods {
            value: 400_000_000,
            max: MAX_TREND_PERIODS,
        })
    );
}

#[test]
fn test_repository_type_from_env() {
    with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
    with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/reports")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres),
    );
    with_scoped_env(&[("REPOSITORY_TYPE", Some("sqlite"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local)
    });
}

#[test]
fn test_repository_toml_with_reports_section() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[repository]\ntype = \"memory\"\n\n[reports]\naccount_quorum = 0.5\n"
    )
    .unwrap();

    let config = RepositoryConfig::from_file(file.path()).unwrap();
    assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
    assert_eq!(config.reports.account_quorum, 0.5);
    assert_eq!(config.reports.trend_periods, 5);
}

#[test]
fn test_oversized_trend_in_repository_toml_fails_validation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"\n\n[reports]\ntrend_periods = 400000000\n").unwrap();

    let config = RepositoryConfig::from_file(file.path()).unwrap();
    assert!(config.reports.validate().is_err());
}

#[test]
fn test_malformed_repository_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository\ntype = ").unwrap();

    let err = RepositoryConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[tokio::test]
async fn test_factory_from_local_config() {
    let config: RepositoryConfig = toml::from_str("[repository]\ntype = \"local\"\n").unwrap();
    let repo = RepositoryFactory::from_config(&config).await.unwrap();
    assert!(repo.health_check().await.unwrap());
}

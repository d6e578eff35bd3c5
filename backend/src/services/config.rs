//! Per-request report configuration.

use serde::{Deserialize, Serialize};

use crate::engine::{SufficiencyGate, TREND_PERIODS};

/// Longest trend a report may ask for.
pub const MAX_TREND_PERIODS: u32 = 52;

/// Out-of-range report tunable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    RatioOutOfRange { name: &'static str, value: f64 },

    #[error("trend_periods must be at most {max}, got {value}")]
    TooManyTrendPeriods { value: u32, max: u32 },
}

/// Tunables of the report computations.
///
/// Loaded once at startup and handed to every report call by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Share of expected registration days an account needs to be reported.
    pub sufficiency_threshold: f64,
    /// Share of requested accounts that must pass the threshold.
    pub account_quorum: f64,
    /// Number of trailing periods in each trend.
    pub trend_periods: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let gate = SufficiencyGate::default();
        Self {
            sufficiency_threshold: gate.threshold,
            account_quorum: gate.quorum,
            trend_periods: TREND_PERIODS,
        }
    }
}

impl ReportConfig {
    /// Apply `REPORT_SUFFICIENCY_THRESHOLD`, `REPORT_ACCOUNT_QUORUM` and
    /// `REPORT_TREND_PERIODS` on top of `self`.
    ///
    /// Unparsable values are ignored with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_value::<f64>("REPORT_SUFFICIENCY_THRESHOLD") {
            self.sufficiency_threshold = v;
        }
        if let Some(v) = env_value::<f64>("REPORT_ACCOUNT_QUORUM") {
            self.account_quorum = v;
        }
        if let Some(v) = env_value::<u32>("REPORT_TREND_PERIODS") {
            self.trend_periods = v;
        }
        self
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Reject ratios outside `[0, 1]` and trends longer than
    /// [`MAX_TREND_PERIODS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("sufficiency_threshold", self.sufficiency_threshold),
            ("account_quorum", self.account_quorum),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RatioOutOfRange { name, value });
            }
        }
        if self.trend_periods > MAX_TREND_PERIODS {
            return Err(ConfigError::TooManyTrendPeriods {
                value: self.trend_periods,
                max: MAX_TREND_PERIODS,
            });
        }
        Ok(())
    }

    pub fn gate(&self) -> SufficiencyGate {
        SufficiencyGate::new(self.sufficiency_threshold, self.account_quorum)
    }
}

fn env_value<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.sufficiency_threshold, 0.7);
        assert_eq!(config.account_quorum, 0.7);
        assert_eq!(config.trend_periods, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ReportConfig = toml::from_str("trend_periods = 3").unwrap();
        assert_eq!(config.trend_periods, 3);
        assert_eq!(config.account_quorum, 0.7);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = ReportConfig {
            account_quorum: 1.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::RatioOutOfRange {
                name: "account_quorum",
                value: 1.5
            })
        );
    }

    #[test]
    fn test_validate_bounds_trend_periods() {
        let long = ReportConfig {
            trend_periods: 400_000_000,
            ..Default::default()
        };
        assert!(matches!(
            long.validate(),
            Err(ConfigError::TooManyTrendPeriods { value: 400_000_000, .. })
        ));
        let longest = ReportConfig {
            trend_periods: MAX_TREND_PERIODS,
            ..Default::default()
        };
        assert!(longest.validate().is_ok());
    }
}

//! Report services.
//!
//! Services sit between the repository layer and the HTTP handlers. Each one
//! normalises a [`ReportRequest`], loads what it needs from storage, runs the
//! [`crate::engine`] pipeline for the requested window and its trend, and
//! assembles the serialisable report body.

pub mod config;
pub mod error;
pub mod fetch;
pub mod frequency;
pub mod improvements;
pub mod request;
pub mod sufficiency;
pub mod waste;

pub use config::{ConfigError, ReportConfig, MAX_TREND_PERIODS};
pub use error::{ReportError, ReportResult};
pub use frequency::{frequency_report, AccountFrequency, FrequencyFigures, FrequencyReport};
pub use improvements::{
    improvement_report, AccountImprovement, ImprovementFigures, ImprovementReport,
};
pub use request::{NormalizedRequest, ReportMeta, ReportRequest};
pub use waste::{waste_report, AccountWaste, WasteFigures, WasteReport};

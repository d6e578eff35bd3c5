//! # Registration reports backend
//!
//! Computes registration frequency, waste and improvement reports for
//! accounts whose expectations change over time.
//!
//! Every account carries settings timelines: which weekdays it should
//! register on, and how much waste it is expected to produce per week. A report
//! window may span several settings changes and may still be running. The
//! engine splits the window along those changes, derives the expected values
//! of each piece, folds in the registrations found in storage and turns the
//! result into scores, costs and forecasts, for the window itself and for the
//! five periods before it.
//!
//! ## Architecture
//!
//! - [`models`]: day, window, settings timeline and registration types
//! - [`engine`]: the pure computation pipeline
//! - [`services`]: report orchestration, request normalisation, configuration
//! - [`db`]: repository traits and the local / Postgres implementations
//! - [`http`]: axum REST surface (feature `http-server`)

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod engine;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

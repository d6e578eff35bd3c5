//! Repository implementations.
//!
//! - `local`: in-memory storage for tests and local development
//! - `postgres`: Diesel/r2d2 storage (feature `postgres-repo`)
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PostgresConfig, PostgresRepository};

//! Storage collaborators of the report engine.
//!
//! The engine only ever asks two questions of storage: "what are the settings
//! timelines of these accounts" and "which registrations did these accounts
//! make in this window". [`SettingsRepository`] and [`RegistrationRepository`]
//! are those questions; [`FullRepository`] is the bound the report services
//! take.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP handlers / report services              │
//! └───────────────────┬──────────────────────────┘
//!                     │ Arc<dyn FullRepository>
//! ┌───────────────────▼──────────────────────────┐
//! │  repository traits (repository/)              │
//! └──────────┬─────────────────────┬─────────────┘
//!            │                     │
//!   LocalRepository       PostgresRepository
//!     (in-memory)        (Diesel, postgres-repo)
//! ```
//!
//! Backends are built by [`RepositoryFactory`] from the environment or from
//! `repository.toml`.

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ErrorContext, FullRepository, RegistrationRepository, RepositoryError, RepositoryResult,
    SettingsRepository,
};

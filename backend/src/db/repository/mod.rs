//! Repository trait definitions for the report collaborators.
//!
//! - [`error`]: Error types for repository operations
//! - [`settings`]: Per-account settings timelines
//! - [`registrations`]: Raw registration facts and per-day counts
//!
//! Functions that need both capabilities bound on [`FullRepository`]:
//!
//! ```ignore
//! async fn report<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let timelines = repo.fetch_registration_days(&accounts).await?;
//!     let rows = repo.fetch_registrations(&accounts, window).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod registrations;
pub mod settings;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use registrations::RegistrationRepository;
pub use settings::SettingsRepository;

/// Composite trait bound for a complete repository implementation.
pub trait FullRepository: SettingsRepository + RegistrationRepository {}

// Blanket implementation: any type implementing both traits is a FullRepository
impl<T> FullRepository for T where T: SettingsRepository + RegistrationRepository {}

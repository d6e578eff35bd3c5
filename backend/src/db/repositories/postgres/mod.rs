//! Postgres repository implementation using Diesel.
//!
//! Two tables back the reports: `account_settings` holds every settings
//! timeline as one row per `(account, kind, effective_from)` with a JSONB
//! value, and `registrations` holds the raw facts.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

mod models;
mod schema;

use async_trait::async_trait;
use diesel::dsl::count_distinct;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::task;

use crate::db::repository::settings::TimelineMap;
use crate::db::repository::{
    ErrorContext, RegistrationRepository, RepositoryError, RepositoryResult, SettingsRepository,
};
use crate::models::{
    AccountId, RegistrationRow, ReportWindow, SettingsEntry, SettingsKind, SettingsTimeline,
    WeekdaySet, WeeklyAmount,
};

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connection_timeout_sec: u64,
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from the environment variables listed in the module docs.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;
        let defaults = Self::default();

        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get()?;
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::configuration(format!("Migration failed: {}", e))
                    .with_operation("run_migrations")
            })?;
        }

        Ok(Self { pool, config })
    }

    /// Run `f` on a pooled connection in a blocking task, retrying retryable
    /// failures with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut retry_delay = Duration::from_millis(retry_delay_ms);
            let mut attempt = 0;
            loop {
                let outcome = pool
                    .get()
                    .map_err(RepositoryError::from)
                    .and_then(|mut conn| f.clone()(&mut conn));
                match outcome {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        attempt += 1;
                        log::debug!("retrying after {:?}: {}", retry_delay, e);
                        std::thread::sleep(retry_delay);
                        retry_delay *= 2;
                    }
                    Err(e) => {
                        log::warn!("query failed after {} attempt(s): {}", attempt + 1, e);
                        return Err(e);
                    }
                }
            }
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)).with_operation("spawn_blocking"))?
    }

    async fn fetch_timelines<V>(
        &self,
        accounts: &[AccountId],
        kind: SettingsKind,
        operation: &'static str,
    ) -> RepositoryResult<TimelineMap<V>>
    where
        V: DeserializeOwned + Send + 'static,
    {
        let ids: Vec<String> = accounts.iter().map(|a| a.to_string()).collect();
        let scope = accounts.to_vec();
        self.with_conn(move |conn| {
            let rows = account_settings::table
                .filter(account_settings::account_id.eq_any(&ids))
                .filter(account_settings::kind.eq(kind.as_str()))
                .order((account_settings::account_id, account_settings::effective_from))
                .select(SettingsRow::as_select())
                .load::<SettingsRow>(conn)?;

            let mut grouped: HashMap<AccountId, Vec<SettingsEntry<V>>> = HashMap::new();
            for row in rows {
                let account = AccountId::new(row.account_id.clone());
                let entry = row.into_entry::<V>().map_err(|e| {
                    RepositoryError::validation_with_context(
                        e.to_string(),
                        ErrorContext::new(operation)
                            .with_entity(kind.as_str())
                            .with_accounts(std::slice::from_ref(&account)),
                    )
                })?;
                grouped.entry(account).or_default().push(entry);
            }

            let mut out = HashMap::new();
            for (account, entries) in grouped {
                let timeline = SettingsTimeline::new(entries)
                    .map_err(|e| RepositoryError::validation(e.to_string()).with_operation(operation))?;
                out.insert(account, timeline);
            }
            if out.is_empty() {
                return Err(RepositoryError::not_found_with_context(
                    "None of the selected accounts have settings",
                    ErrorContext::new(operation)
                        .with_entity(kind.as_str())
                        .with_accounts(&scope),
                ));
            }
            Ok(out)
        })
        .await
    }

    async fn upsert_entry<V>(
        &self,
        account: &AccountId,
        kind: SettingsKind,
        entry: SettingsEntry<V>,
    ) -> RepositoryResult<()>
    where
        V: Serialize,
    {
        let row = NewSettingsRow {
            account_id: account.to_string(),
            kind: kind.as_str().to_string(),
            effective_from: entry.effective_from.date(),
            value: serde_json::to_value(&entry.value)
                .map_err(|e| RepositoryError::validation(e.to_string()))?,
        };
        self.with_conn(move |conn| {
            diesel::insert_into(account_settings::table)
                .values(&row)
                .on_conflict((
                    account_settings::account_id,
                    account_settings::kind,
                    account_settings::effective_from,
                ))
                .do_update()
                .set(account_settings::value.eq(excluded(account_settings::value)))
                .execute(conn)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl SettingsRepository for PostgresRepository {
    async fn fetch_registration_days(
        &self,
        accounts: &[AccountId],
    ) -> RepositoryResult<TimelineMap<WeekdaySet>> {
        self.fetch_timelines(
            accounts,
            SettingsKind::RegistrationDays,
            "fetch_registration_days",
        )
        .await
    }

    async fn fetch_expected_waste(
        &self,
        accounts: &[AccountId],
    ) -> RepositoryResult<TimelineMap<WeeklyAmount>> {
        self.fetch_timelines(
            accounts,
            SettingsKind::ExpectedWeeklyWaste,
            "fetch_expected_waste",
        )
        .await
    }

    async fn store_registration_days(
        &self,
        account: &AccountId,
        entry: SettingsEntry<WeekdaySet>,
    ) -> RepositoryResult<()> {
        self.upsert_entry(account, SettingsKind::RegistrationDays, entry)
            .await
    }

    async fn store_expected_waste(
        &self,
        account: &AccountId,
        entry: SettingsEntry<WeeklyAmount>,
    ) -> RepositoryResult<()> {
        self.upsert_entry(account, SettingsKind::ExpectedWeeklyWaste, entry)
            .await
    }
}

#[async_trait]
impl RegistrationRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn fetch_registrations(
        &self,
        accounts: &[AccountId],
        window: ReportWindow,
    ) -> RepositoryResult<Vec<RegistrationRow>> {
        let ids: Vec<String> = accounts.iter().map(|a| a.to_string()).collect();
        let (start, end) = (window.start.date(), window.end.date());
        self.with_conn(move |conn| {
            let rows = registrations::table
                .filter(registrations::customer_id.eq_any(&ids))
                .filter(registrations::date.between(start, end))
                .order((registrations::date, registrations::id))
                .select(RegistrationDbRow::as_select())
                .load::<RegistrationDbRow>(conn)?;
            Ok(rows.into_iter().map(RegistrationRow::from).collect())
        })
        .await
        .map_err(|e| e.with_scope(accounts, Some(window)))
    }

    async fn count_registration_days(
        &self,
        accounts: &[AccountId],
        window: ReportWindow,
    ) -> RepositoryResult<HashMap<AccountId, u32>> {
        let ids: Vec<String> = accounts.iter().map(|a| a.to_string()).collect();
        let (start, end) = (window.start.date(), window.end.date());
        self.with_conn(move |conn| {
            let counts: Vec<(String, i64)> = registrations::table
                .filter(registrations::customer_id.eq_any(&ids))
                .filter(registrations::date.between(start, end))
                .group_by(registrations::customer_id)
                .select((registrations::customer_id, count_distinct(registrations::date)))
                .load(conn)?;
            Ok(counts
                .into_iter()
                .map(|(account, days)| (AccountId::new(account), days as u32))
                .collect())
        })
        .await
        .map_err(|e| e.with_scope(accounts, Some(window)))
    }

    async fn store_registrations(&self, rows: &[RegistrationRow]) -> RepositoryResult<usize> {
        let new_rows: Vec<NewRegistrationRow> = rows.iter().map(NewRegistrationRow::from).collect();
        self.with_conn(move |conn| {
            let inserted = diesel::insert_into(registrations::table)
                .values(&new_rows)
                .execute(conn)?;
            Ok(inserted)
        })
        .await
    }
}

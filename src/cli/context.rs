//! Wiring of services from the loaded configuration.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::media::build_client;
use crate::adapters::sqlite::{
    initialize_database, SqliteApplicationRepository, SqliteReconciliationLedger,
};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::services::{ApplicationIntake, ApplicationStore, AssetCoordinator, RetryPolicy};

pub struct AppContext {
    pub config: Config,
    pub intake: ApplicationIntake<SqliteApplicationRepository>,
}

impl AppContext {
    /// Load project configuration and open the database.
    pub async fn load() -> Result<Self> {
        let config = ConfigLoader::load().context("Failed to load configuration")?;
        Self::from_config(config).await
    }

    pub async fn from_config(config: Config) -> Result<Self> {
        let pool = initialize_database(&config.database)
            .await
            .context("Failed to initialize database. Run 'hireflow init' first.")?;

        let client = build_client(&config.media).context("Failed to configure media store")?;
        let ledger = Arc::new(SqliteReconciliationLedger::new(pool.clone()));
        let assets = AssetCoordinator::new(client, ledger, config.media.namespace.clone())
            .with_retry_policy(RetryPolicy::from(&config.retry))
            .with_call_timeout(operation_deadline(&config));

        let store = ApplicationStore::new(Arc::new(SqliteApplicationRepository::new(pool)));
        let intake = ApplicationIntake::new(store, Arc::new(assets));

        Ok(Self { config, intake })
    }
}

/// Deadline for one remote operation: every attempt may use the full
/// per-request timeout, plus the longest possible backoff between them.
fn operation_deadline(config: &Config) -> Duration {
    let attempts = u64::from(config.retry.max_attempts.max(1));
    let per_request = Duration::from_secs(config.media.timeout_secs);
    let backoff = Duration::from_millis(config.retry.max_backoff_ms.saturating_mul(attempts - 1));
    per_request.saturating_mul(attempts as u32) + backoff
}

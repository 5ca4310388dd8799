//! Common test utilities for integration tests
//!
//! Shared fixtures used across the integration test files.

#![allow(dead_code)]

use std::sync::Arc;

use hireflow::adapters::ledger::InMemoryReconciliationLedger;
use hireflow::adapters::media::InMemoryAssetClient;
use hireflow::adapters::sqlite::{
    create_migrated_test_pool, SqliteApplicationRepository, SqliteReconciliationLedger,
};
use hireflow::domain::models::LocalFile;
use hireflow::services::{ApplicationIntake, ApplicationStore, AssetCoordinator, RetryPolicy};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Application store over a fresh in-memory database.
pub async fn test_store() -> ApplicationStore<SqliteApplicationRepository> {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create test database");
    ApplicationStore::new(Arc::new(SqliteApplicationRepository::new(pool)))
}

/// Retry policy with millisecond backoff so retry tests stay fast.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, 1, 5)
}

/// Coordinator over an in-memory media store and ledger.
pub fn test_coordinator(client: Arc<InMemoryAssetClient>) -> AssetCoordinator {
    AssetCoordinator::new(client, Arc::new(InMemoryReconciliationLedger::new()), "applications")
        .with_retry_policy(fast_retry())
}

/// Full intake stack: SQLite store and ledger, in-memory media store.
pub async fn test_intake(
    client: Arc<InMemoryAssetClient>,
) -> ApplicationIntake<SqliteApplicationRepository> {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create test database");
    let store = ApplicationStore::new(Arc::new(SqliteApplicationRepository::new(pool.clone())));
    let assets = AssetCoordinator::new(
        client,
        Arc::new(SqliteReconciliationLedger::new(pool)),
        "applications",
    )
    .with_retry_policy(fast_retry());
    ApplicationIntake::new(store, Arc::new(assets))
}

/// A small PDF-looking file.
pub fn cv_file(name: &str) -> LocalFile {
    LocalFile::new(name, format!("%PDF-1.7 {name}").into_bytes()).with_content_type("application/pdf")
}

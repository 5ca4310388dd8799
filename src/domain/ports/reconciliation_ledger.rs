use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::ReconciliationWarning;

/// Durable record of remote objects that need manual reconciliation
#[async_trait]
pub trait ReconciliationLedger: Send + Sync {
    /// Record a new warning
    async fn record(&self, warning: &ReconciliationWarning) -> DomainResult<()>;

    /// Warnings not yet resolved, oldest first
    async fn unresolved(&self) -> DomainResult<Vec<ReconciliationWarning>>;

    /// Mark a warning handled; returns false if unknown or already resolved
    async fn resolve(&self, id: Uuid) -> DomainResult<bool>;
}

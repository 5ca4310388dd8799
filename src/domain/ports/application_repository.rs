use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Application, ApplicationStatus, AssetRef};

/// Filters for querying applications
#[derive(Default, Debug, Clone)]
pub struct ApplicationFilter {
    pub job_id: Option<String>,
    pub applicant_id: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub limit: Option<i64>,
}

/// Repository port for application persistence operations
///
/// Every mutation is a single-document atomic write. Conditional updates
/// return `Ok(None)` when the expectation no longer holds so the caller can
/// re-read and decide how to report the conflict.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Insert a new application
    async fn insert(&self, application: &Application) -> DomainResult<()>;

    /// Get an application by ID
    async fn get(&self, id: Uuid) -> DomainResult<Option<Application>>;

    /// Set `status` only if the persisted status still equals `expected`
    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        target: ApplicationStatus,
    ) -> DomainResult<Option<Application>>;

    /// Set `cvAsset` only if the persisted reference still equals `expected`
    async fn compare_and_set_cv(
        &self,
        id: Uuid,
        expected: Option<&AssetRef>,
        replacement: Option<&AssetRef>,
    ) -> DomainResult<Option<Application>>;

    /// Delete an application by ID, returning the row as it was at deletion
    async fn delete(&self, id: Uuid) -> DomainResult<Option<Application>>;

    /// List applications, most recently applied first
    async fn list(&self, filter: ApplicationFilter) -> DomainResult<Vec<Application>>;
}

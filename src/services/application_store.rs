//! Application lifecycle service.

use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Application, ApplicationStatus, AssetRef, NewApplication};
use crate::domain::ports::{ApplicationFilter, ApplicationRepository};

pub struct ApplicationStore<R: ApplicationRepository> {
    repo: Arc<R>,
}

impl<R: ApplicationRepository> Clone for ApplicationStore<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: ApplicationRepository> ApplicationStore<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Create a pending application.
    #[instrument(skip(self, input), fields(job_id = %input.job_id, applicant_id = %input.applicant_id))]
    pub async fn create(&self, input: NewApplication) -> DomainResult<Application> {
        let application = Application::from_new(input).map_err(DomainError::Validation)?;
        self.repo.insert(&application).await?;

        info!(application_id = %application.id, "application created");
        Ok(application)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Application> {
        self.repo
            .get(id)
            .await?
            .ok_or(DomainError::ApplicationNotFound(id))
    }

    /// Move an application to `target`.
    ///
    /// The write is a compare-and-set on the status read here. If another
    /// writer got there first, the record is read again: an edge that is no
    /// longer valid reports `InvalidTransition` from the new status, anything
    /// else reports `ConcurrencyConflict`. Nothing is retried.
    #[instrument(skip(self), fields(to = %target))]
    pub async fn transition(&self, id: Uuid, target: ApplicationStatus) -> DomainResult<Application> {
        let current = self.get(id).await?;
        Self::check_edge(current.status, target)?;

        if let Some(updated) = self
            .repo
            .compare_and_set_status(id, current.status, target)
            .await?
        {
            info!(
                application_id = %id,
                from = %current.status,
                to = %target,
                "application status changed"
            );
            return Ok(updated);
        }

        let fresh = self.get(id).await?;
        debug!(
            application_id = %id,
            expected = %current.status,
            found = %fresh.status,
            "lost status race"
        );
        Self::check_edge(fresh.status, target)?;
        Err(DomainError::ConcurrencyConflict(id))
    }

    fn check_edge(from: ApplicationStatus, to: ApplicationStatus) -> DomainResult<()> {
        if from.can_transition_to(to) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition { from, to })
        }
    }

    /// Swap the CV reference if it still equals `expected`.
    #[instrument(skip(self, expected, replacement))]
    pub async fn replace_cv(
        &self,
        id: Uuid,
        expected: Option<&AssetRef>,
        replacement: Option<&AssetRef>,
    ) -> DomainResult<Application> {
        match self.repo.compare_and_set_cv(id, expected, replacement).await? {
            Some(updated) => {
                info!(
                    application_id = %id,
                    cv_asset = replacement.map(|a| a.id.as_str()),
                    "application CV replaced"
                );
                Ok(updated)
            }
            None => {
                self.get(id).await?;
                Err(DomainError::ConcurrencyConflict(id))
            }
        }
    }

    /// Delete an application and return the state it had when deleted.
    pub async fn remove(&self, id: Uuid) -> DomainResult<Application> {
        let last = self
            .repo
            .delete(id)
            .await?
            .ok_or(DomainError::ApplicationNotFound(id))?;
        info!(application_id = %id, "application removed");
        Ok(last)
    }

    pub async fn list_by_job(&self, job_id: &str) -> DomainResult<Vec<Application>> {
        self.list(ApplicationFilter {
            job_id: Some(job_id.to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn list_by_applicant(&self, applicant_id: &str) -> DomainResult<Vec<Application>> {
        self.list(ApplicationFilter {
            applicant_id: Some(applicant_id.to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn list_by_status(&self, status: ApplicationStatus) -> DomainResult<Vec<Application>> {
        self.list(ApplicationFilter {
            status: Some(status),
            ..Default::default()
        })
        .await
    }

    /// Most recently applied first.
    pub async fn list(&self, filter: ApplicationFilter) -> DomainResult<Vec<Application>> {
        self.repo.list(filter).await
    }
}

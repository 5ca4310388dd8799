//! Submitting, updating and withdrawing applications together with their CV.
//!
//! Persistence and the media store cannot share a transaction, so every
//! operation orders its steps to keep the record pointing at a live object:
//! upload first, persist second, release the superseded object last. When
//! persisting fails after an upload, the fresh object is released again.

use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::application_store::ApplicationStore;
use super::asset_coordinator::AssetCoordinator;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Application, ApplicationStatus, AssetRef, LocalFile, NewApplication, ReconciliationWarning,
};
use crate::domain::ports::ApplicationRepository;

/// An application plus any non-fatal cleanup problems hit on the way.
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub application: Application,
    pub warnings: Vec<ReconciliationWarning>,
}

/// Fields of a new submission.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub job_id: String,
    pub applicant_id: String,
    pub message: Option<String>,
    pub cv: Option<LocalFile>,
}

impl Submission {
    pub fn new(job_id: impl Into<String>, applicant_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            applicant_id: applicant_id.into(),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_cv(mut self, file: LocalFile) -> Self {
        self.cv = Some(file);
        self
    }
}

pub struct ApplicationIntake<R: ApplicationRepository> {
    store: ApplicationStore<R>,
    assets: Arc<AssetCoordinator>,
}

impl<R: ApplicationRepository> ApplicationIntake<R> {
    pub fn new(store: ApplicationStore<R>, assets: Arc<AssetCoordinator>) -> Self {
        Self { store, assets }
    }

    pub fn store(&self) -> &ApplicationStore<R> {
        &self.store
    }

    pub fn assets(&self) -> &AssetCoordinator {
        &self.assets
    }

    /// Create an application, uploading its CV first when one is given.
    #[instrument(skip(self, submission), fields(job_id = %submission.job_id, applicant_id = %submission.applicant_id))]
    pub async fn submit(&self, submission: Submission) -> DomainResult<IntakeOutcome> {
        let mut input = NewApplication::new(submission.job_id, submission.applicant_id);
        input.message = submission.message;
        input.validate().map_err(DomainError::Validation)?;

        let Some(file) = submission.cv else {
            let application = self.store.create(input).await?;
            return Ok(IntakeOutcome { application, warnings: Vec::new() });
        };

        let attachment = self.assets.attach(&file, None).await?;
        let uploaded = attachment.asset;
        match self.store.create(input.with_cv_asset(uploaded.clone())).await {
            Ok(application) => Ok(IntakeOutcome { application, warnings: attachment.warnings }),
            Err(err) => Err(self.compensate(&uploaded, err).await),
        }
    }

    /// Upload a new CV, point the application at it, then release the old one.
    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn replace_cv(&self, id: Uuid, file: &LocalFile) -> DomainResult<IntakeOutcome> {
        let current = self.store.get(id).await?;
        let previous = current.cv_asset;

        let attachment = self.assets.attach(file, None).await?;
        let uploaded = attachment.asset;
        let application = match self
            .store
            .replace_cv(id, previous.as_ref(), Some(&uploaded))
            .await
        {
            Ok(application) => application,
            Err(err) => return Err(self.compensate(&uploaded, err).await),
        };

        let mut warnings = attachment.warnings;
        if let Some(old) = previous.filter(|old| old.id != uploaded.id) {
            if let Some(warning) = self.assets.retire(&old, "superseded by a newer CV").await {
                warnings.push(warning);
            }
        }

        Ok(IntakeOutcome { application, warnings })
    }

    pub async fn transition(&self, id: Uuid, target: ApplicationStatus) -> DomainResult<Application> {
        self.store.transition(id, target).await
    }

    /// Release the CV, then delete the record.
    ///
    /// If the release fails the record is kept and the error returned, so
    /// the withdrawal can be attempted again.
    #[instrument(skip(self))]
    pub async fn withdraw(&self, id: Uuid) -> DomainResult<IntakeOutcome> {
        let current = self.store.get(id).await?;
        if let Some(asset) = &current.cv_asset {
            self.assets.release(asset).await?;
        }

        let removed = self.store.remove(id).await?;

        let mut warnings = Vec::new();
        // A concurrent replace may have attached a different CV in between.
        if let Some(late) = removed.cv_asset.as_ref().filter(|a| Some(*a) != current.cv_asset.as_ref()) {
            if let Some(warning) = self.assets.retire(late, "attached to a withdrawn application").await {
                warnings.push(warning);
            }
        }

        info!(application_id = %id, "application withdrawn");
        Ok(IntakeOutcome { application: removed, warnings })
    }

    /// Undo an upload whose record could not be written, returning `err`.
    async fn compensate(&self, uploaded: &AssetRef, err: DomainError) -> DomainError {
        warn!(asset_id = %uploaded.id, error = %err, "persisting failed, releasing fresh upload");
        self.assets
            .retire(uploaded, "upload not persisted to any application")
            .await;
        err
    }
}

//! Keeps application CV references consistent with the remote media store.
//!
//! Replacement uploads the new object before touching the old one, so a
//! failed upload never destroys a still-valid CV. Cleanup failures after a
//! successful upload are not fatal: the stale object is recorded in the
//! reconciliation ledger as an orphan and the new reference is returned.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::retry::RetryPolicy;
use crate::domain::errors::{AssetError, DomainResult};
use crate::domain::models::{
    AssetRef, Attachment, DestroyResult, LocalFile, ReconciliationWarning, ReleaseOutcome,
    UploadOptions,
};
use crate::domain::ports::{ReconciliationLedger, RemoteAssetClient};

pub struct AssetCoordinator {
    client: Arc<dyn RemoteAssetClient>,
    ledger: Arc<dyn ReconciliationLedger>,
    retry: RetryPolicy,
    namespace: String,
    call_timeout: Option<Duration>,
}

impl AssetCoordinator {
    pub fn new(
        client: Arc<dyn RemoteAssetClient>,
        ledger: Arc<dyn ReconciliationLedger>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            client,
            ledger,
            retry: RetryPolicy::default(),
            namespace: namespace.into(),
            call_timeout: None,
        }
    }

    /// Use a custom retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Bound every remote operation (all attempts together) by `timeout`.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Upload `file`, then release `existing` if one is being replaced.
    pub async fn attach(
        &self,
        file: &LocalFile,
        existing: Option<&AssetRef>,
    ) -> Result<Attachment, AssetError> {
        self.attach_inner(file, existing, self.call_timeout).await
    }

    /// Like [`attach`](Self::attach), with an explicit deadline for the upload.
    pub async fn attach_within(
        &self,
        file: &LocalFile,
        existing: Option<&AssetRef>,
        timeout: Duration,
    ) -> Result<Attachment, AssetError> {
        self.attach_inner(file, existing, Some(timeout)).await
    }

    #[instrument(skip(self, file), fields(file_name = %file.file_name, replacing = existing.map(|a| a.id.as_str())))]
    async fn attach_inner(
        &self,
        file: &LocalFile,
        existing: Option<&AssetRef>,
        timeout: Option<Duration>,
    ) -> Result<Attachment, AssetError> {
        let (asset, mut warnings) = self.upload(file, timeout).await?;

        if let Some(old) = existing.filter(|old| old.id != asset.id) {
            if let Some(warning) = self.retire(old, "replaced by a new upload").await {
                warnings.push(warning);
            }
        }

        Ok(Attachment { asset, warnings })
    }

    /// Upload without touching any existing object.
    ///
    /// Attempts that timed out may still have stored a copy, so each one is
    /// recorded as an unknown upload and returned alongside the asset.
    async fn upload(
        &self,
        file: &LocalFile,
        timeout: Option<Duration>,
    ) -> Result<(AssetRef, Vec<ReconciliationWarning>), AssetError> {
        let options = UploadOptions::from(file);
        let unknown = Mutex::new(Vec::new());
        let retried = self
            .retry
            .execute("upload", |attempt| self.upload_once(file, &options, attempt, &unknown));

        let outcome = bounded(timeout, retried).await;
        let unknown = unknown.into_inner().unwrap_or_else(|e| e.into_inner());
        match outcome {
            Some(result) => result.map(|asset| (asset, unknown)),
            None => {
                let reason = format!(
                    "upload of {} cancelled after {:?}; remote outcome unknown",
                    file.file_name,
                    timeout.unwrap_or_default()
                );
                warn!(
                    operation = "upload",
                    namespace = %self.namespace,
                    file_name = %file.file_name,
                    outcome = "cancelled",
                    "upload cancelled by deadline, recording for reconciliation"
                );
                self.record(ReconciliationWarning::unknown_upload(&self.namespace, reason))
                    .await;
                Err(AssetError::Cancelled {
                    operation: "upload".to_string(),
                    target: format!("{}/{}", self.namespace, file.file_name),
                })
            }
        }
    }

    async fn upload_once(
        &self,
        file: &LocalFile,
        options: &UploadOptions,
        attempt: u32,
        unknown: &Mutex<Vec<ReconciliationWarning>>,
    ) -> Result<AssetRef, AssetError> {
        let result = self.client.upload(&file.bytes, &self.namespace, options).await;
        match &result {
            Err(err) if err.is_timeout() => {
                let warning = ReconciliationWarning::unknown_upload(
                    &self.namespace,
                    format!(
                        "upload attempt {attempt} of {} timed out; remote outcome unknown",
                        file.file_name
                    ),
                );
                warn!(
                    operation = "upload",
                    namespace = %self.namespace,
                    file_name = %file.file_name,
                    attempt,
                    outcome = "timed_out",
                    warning_id = %warning.id,
                    error = %err,
                    "upload attempt timed out, recording for reconciliation"
                );
                self.record(warning.clone()).await;
                unknown.lock().unwrap_or_else(|e| e.into_inner()).push(warning);
            }
            Ok(asset) => info!(
                operation = "upload",
                namespace = %self.namespace,
                asset_id = %asset.id,
                attempt,
                outcome = "uploaded",
                "asset uploaded"
            ),
            Err(err) => warn!(
                operation = "upload",
                namespace = %self.namespace,
                file_name = %file.file_name,
                attempt,
                outcome = "failed",
                error = %err,
                "asset upload attempt failed"
            ),
        }
        result
    }

    /// Delete a remote object. An object that is already gone counts as released.
    pub async fn release(&self, asset: &AssetRef) -> Result<ReleaseOutcome, AssetError> {
        self.release_inner(asset, self.call_timeout).await
    }

    /// Like [`release`](Self::release), with an explicit deadline.
    pub async fn release_within(
        &self,
        asset: &AssetRef,
        timeout: Duration,
    ) -> Result<ReleaseOutcome, AssetError> {
        self.release_inner(asset, Some(timeout)).await
    }

    async fn release_inner(
        &self,
        asset: &AssetRef,
        timeout: Option<Duration>,
    ) -> Result<ReleaseOutcome, AssetError> {
        let retried = self
            .retry
            .execute("destroy", |attempt| self.destroy_once(&asset.id, attempt));

        match bounded(timeout, retried).await {
            Some(Ok(DestroyResult::Destroyed)) => Ok(ReleaseOutcome::Released),
            Some(Ok(DestroyResult::NotFound)) | Some(Err(AssetError::NotFound(_))) => {
                Ok(ReleaseOutcome::AlreadyGone)
            }
            Some(Err(err)) => Err(err),
            None => {
                warn!(operation = "destroy", asset_id = %asset.id, outcome = "cancelled", "destroy cancelled by deadline");
                Err(AssetError::Cancelled {
                    operation: "destroy".to_string(),
                    target: asset.id.clone(),
                })
            }
        }
    }

    async fn destroy_once(&self, id: &str, attempt: u32) -> Result<DestroyResult, AssetError> {
        let result = self.client.destroy(id).await;
        match &result {
            Ok(DestroyResult::Destroyed) => {
                info!(operation = "destroy", asset_id = id, attempt, outcome = "destroyed", "asset destroyed");
            }
            Ok(DestroyResult::NotFound) | Err(AssetError::NotFound(_)) => {
                info!(operation = "destroy", asset_id = id, attempt, outcome = "not_found", "asset already gone");
            }
            Err(err) => warn!(
                operation = "destroy",
                asset_id = id,
                attempt,
                outcome = "failed",
                error = %err,
                "asset destroy attempt failed"
            ),
        }
        result
    }

    /// Release an object nobody should reference any more.
    ///
    /// Failure is not propagated: the object is recorded as an orphan and
    /// the warning returned.
    pub async fn retire(&self, asset: &AssetRef, why: &str) -> Option<ReconciliationWarning> {
        match self.release(asset).await {
            Ok(_) => None,
            Err(err) => {
                let warning = ReconciliationWarning::orphan(
                    asset,
                    &self.namespace,
                    format!("{why}; cleanup failed: {err}"),
                );
                warn!(
                    operation = "destroy",
                    asset_id = %asset.id,
                    outcome = "orphaned",
                    warning_id = %warning.id,
                    error = %err,
                    "stale asset left behind, recorded for reconciliation"
                );
                self.record(warning.clone()).await;
                Some(warning)
            }
        }
    }

    /// Unresolved reconciliation entries, oldest first.
    pub async fn pending_reconciliation(&self) -> DomainResult<Vec<ReconciliationWarning>> {
        self.ledger.unresolved().await
    }

    /// Mark a reconciliation entry handled.
    pub async fn resolve(&self, warning_id: Uuid) -> DomainResult<bool> {
        self.ledger.resolve(warning_id).await
    }

    async fn record(&self, warning: ReconciliationWarning) {
        if let Err(err) = self.ledger.record(&warning).await {
            error!(
                warning_id = %warning.id,
                kind = warning.kind.as_str(),
                asset_id = warning.asset_id.as_deref(),
                reason = %warning.reason,
                error = %err,
                "failed to persist reconciliation entry"
            );
        }
    }
}

/// Await `fut`, giving up after `timeout` if one is set.
async fn bounded<F: Future>(timeout: Option<Duration>, fut: F) -> Option<F::Output> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}

//! End-to-end intake flows: SQLite records, ledger, in-memory media store.

mod common;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use hireflow::adapters::ledger::InMemoryReconciliationLedger;
use hireflow::adapters::media::{InMemoryAssetClient, ScriptedFailure};
use hireflow::adapters::sqlite::{create_migrated_test_pool, SqliteApplicationRepository};
use hireflow::domain::errors::{AssetError, DomainError, DomainResult};
use hireflow::domain::models::{
    Application, ApplicationStatus, AssetRef, ReconciliationKind,
};
use hireflow::domain::ports::{ApplicationFilter, ApplicationRepository};
use hireflow::services::{ApplicationIntake, ApplicationStore, AssetCoordinator, Submission};

#[tokio::test]
async fn test_submit_review_replace_withdraw() {
    common::setup_test_logging();
    let client = Arc::new(InMemoryAssetClient::new());
    let intake = common::test_intake(client.clone()).await;

    let app = intake
        .submit(
            Submission::new("J1", "U1")
                .with_message("Keen to join")
                .with_cv(common::cv_file("v1.pdf")),
        )
        .await
        .unwrap()
        .application;
    let a1 = app.cv_asset.clone().unwrap();

    intake.transition(app.id, ApplicationStatus::Reviewed).await.unwrap();

    let replaced = intake
        .replace_cv(app.id, &common::cv_file("v2.pdf"))
        .await
        .unwrap();
    let a2 = replaced.application.cv_asset.clone().unwrap();
    assert_eq!(replaced.application.status, ApplicationStatus::Reviewed);
    assert!(!client.contains(&a1.id));
    assert!(client.contains(&a2.id));

    let withdrawn = intake.withdraw(app.id).await.unwrap();
    assert_eq!(withdrawn.application.cv_asset, Some(a2));
    assert!(client.is_empty());
    assert!(intake.store().list_by_job("J1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_replace_with_failed_cleanup_is_persisted_in_ledger() {
    let client = Arc::new(InMemoryAssetClient::new());
    let intake = common::test_intake(client.clone()).await;

    let app = intake
        .submit(Submission::new("J1", "U1").with_cv(common::cv_file("v1.pdf")))
        .await
        .unwrap()
        .application;
    let a1 = app.cv_asset.clone().unwrap();

    client.fail_destroys([ScriptedFailure::Config]);
    let outcome = intake
        .replace_cv(app.id, &common::cv_file("v2.pdf"))
        .await
        .unwrap();

    assert_ne!(outcome.application.cv_asset.as_ref(), Some(&a1));
    assert_eq!(outcome.warnings.len(), 1);

    let pending = intake.assets().pending_reconciliation().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, ReconciliationKind::Orphan);
    assert_eq!(pending[0].asset_id.as_deref(), Some(a1.id.as_str()));

    assert!(intake.assets().resolve(pending[0].id).await.unwrap());
    assert!(!intake.assets().resolve(pending[0].id).await.unwrap());
    assert!(intake.assets().pending_reconciliation().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_withdraw_without_cv() {
    let client = Arc::new(InMemoryAssetClient::new());
    let intake = common::test_intake(client.clone()).await;

    let app = intake
        .submit(Submission::new("J1", "U1"))
        .await
        .unwrap()
        .application;
    let outcome = intake.withdraw(app.id).await.unwrap();

    assert_eq!(outcome.application.id, app.id);
    assert_eq!(client.destroy_calls(), 0);
}

#[tokio::test]
async fn test_withdraw_tolerates_already_deleted_cv() {
    let client = Arc::new(InMemoryAssetClient::new());
    let intake = common::test_intake(client.clone()).await;

    let app = intake
        .submit(Submission::new("J1", "U1").with_cv(common::cv_file("cv.pdf")))
        .await
        .unwrap()
        .application;
    intake
        .assets()
        .release(app.cv_asset.as_ref().unwrap())
        .await
        .unwrap();

    intake.withdraw(app.id).await.unwrap();
    assert!(matches!(
        intake.store().get(app.id).await,
        Err(DomainError::ApplicationNotFound(_))
    ));
}

#[tokio::test]
async fn test_upload_timeout_is_recorded() {
    let client = Arc::new(InMemoryAssetClient::new().with_upload_delay(Duration::from_millis(500)));
    let pool = hireflow::adapters::sqlite::create_migrated_test_pool().await.unwrap();
    let store = ApplicationStore::new(Arc::new(
        hireflow::adapters::sqlite::SqliteApplicationRepository::new(pool.clone()),
    ));
    let assets = AssetCoordinator::new(
        client,
        Arc::new(hireflow::adapters::sqlite::SqliteReconciliationLedger::new(pool)),
        "applications",
    )
    .with_retry_policy(common::fast_retry())
    .with_call_timeout(Duration::from_millis(20));
    let intake = ApplicationIntake::new(store, Arc::new(assets));

    let err = intake
        .submit(Submission::new("J1", "U1").with_cv(common::cv_file("slow.pdf")))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Asset(AssetError::Cancelled { .. })));
    assert!(intake.store().list_by_job("J1").await.unwrap().is_empty());

    let pending = intake.assets().pending_reconciliation().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, ReconciliationKind::UnknownUpload);
    assert_eq!(pending[0].namespace, "applications");
}

/// Repository whose writes always fail.
struct BrokenRepository;

#[async_trait]
impl ApplicationRepository for BrokenRepository {
    async fn insert(&self, _application: &Application) -> DomainResult<()> {
        Err(DomainError::Database("disk I/O error".into()))
    }

    async fn get(&self, _id: Uuid) -> DomainResult<Option<Application>> {
        Ok(None)
    }

    async fn compare_and_set_status(
        &self,
        _id: Uuid,
        _expected: ApplicationStatus,
        _target: ApplicationStatus,
    ) -> DomainResult<Option<Application>> {
        Err(DomainError::Database("disk I/O error".into()))
    }

    async fn compare_and_set_cv(
        &self,
        _id: Uuid,
        _expected: Option<&AssetRef>,
        _replacement: Option<&AssetRef>,
    ) -> DomainResult<Option<Application>> {
        Err(DomainError::Database("disk I/O error".into()))
    }

    async fn delete(&self, _id: Uuid) -> DomainResult<Option<Application>> {
        Err(DomainError::Database("disk I/O error".into()))
    }

    async fn list(&self, _filter: ApplicationFilter) -> DomainResult<Vec<Application>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_failed_insert_releases_fresh_upload() {
    let client = Arc::new(InMemoryAssetClient::new());
    let ledger = Arc::new(InMemoryReconciliationLedger::new());
    let assets = AssetCoordinator::new(client.clone(), ledger, "applications")
        .with_retry_policy(common::fast_retry());
    let intake = ApplicationIntake::new(
        ApplicationStore::new(Arc::new(BrokenRepository)),
        Arc::new(assets),
    );

    let err = intake
        .submit(Submission::new("J1", "U1").with_cv(common::cv_file("cv.pdf")))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Database(_)));
    assert_eq!(client.upload_calls(), 1);
    assert!(client.is_empty(), "the orphaned upload should have been released");
}

#[tokio::test]
async fn test_failed_compensation_leaves_orphan() {
    let client = Arc::new(InMemoryAssetClient::new());
    client.fail_destroys([ScriptedFailure::Config]);
    let ledger = Arc::new(InMemoryReconciliationLedger::new());
    let assets = AssetCoordinator::new(client.clone(), ledger, "applications")
        .with_retry_policy(common::fast_retry());
    let intake = ApplicationIntake::new(
        ApplicationStore::new(Arc::new(BrokenRepository)),
        Arc::new(assets),
    );

    assert!(intake
        .submit(Submission::new("J1", "U1").with_cv(common::cv_file("cv.pdf")))
        .await
        .is_err());

    assert_eq!(client.len(), 1);
    let pending = intake.assets().pending_reconciliation().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, ReconciliationKind::Orphan);
}

/// SQLite repository that swaps the CV reference right before deleting,
/// as a concurrent `replace_cv` landing between withdraw's steps would.
struct SwapBeforeDelete {
    inner: SqliteApplicationRepository,
    swap: std::sync::Mutex<Option<(AssetRef, AssetRef)>>,
}

#[async_trait]
impl ApplicationRepository for SwapBeforeDelete {
    async fn insert(&self, application: &Application) -> DomainResult<()> {
        self.inner.insert(application).await
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Application>> {
        self.inner.get(id).await
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        target: ApplicationStatus,
    ) -> DomainResult<Option<Application>> {
        self.inner.compare_and_set_status(id, expected, target).await
    }

    async fn compare_and_set_cv(
        &self,
        id: Uuid,
        expected: Option<&AssetRef>,
        replacement: Option<&AssetRef>,
    ) -> DomainResult<Option<Application>> {
        self.inner.compare_and_set_cv(id, expected, replacement).await
    }

    async fn delete(&self, id: Uuid) -> DomainResult<Option<Application>> {
        let swap = self.swap.lock().unwrap().take();
        if let Some((from, to)) = swap {
            self.inner.compare_and_set_cv(id, Some(&from), Some(&to)).await?;
        }
        self.inner.delete(id).await
    }

    async fn list(&self, filter: ApplicationFilter) -> DomainResult<Vec<Application>> {
        self.inner.list(filter).await
    }
}

#[tokio::test]
async fn test_withdraw_retires_cv_swapped_in_before_delete() {
    let pool = create_migrated_test_pool().await.unwrap();
    let repo = Arc::new(SwapBeforeDelete {
        inner: SqliteApplicationRepository::new(pool),
        swap: std::sync::Mutex::new(None),
    });
    let client = Arc::new(InMemoryAssetClient::new());
    let intake = ApplicationIntake::new(
        ApplicationStore::new(repo.clone()),
        Arc::new(common::test_coordinator(client.clone())),
    );

    let app = intake
        .submit(Submission::new("J1", "U1").with_cv(common::cv_file("v1.pdf")))
        .await
        .unwrap()
        .application;
    let a1 = app.cv_asset.clone().unwrap();
    let a2 = intake
        .assets()
        .attach(&common::cv_file("v2.pdf"), None)
        .await
        .unwrap()
        .asset;
    *repo.swap.lock().unwrap() = Some((a1.clone(), a2.clone()));

    let outcome = intake.withdraw(app.id).await.unwrap();

    assert_eq!(outcome.application.cv_asset, Some(a2.clone()));
    assert!(outcome.warnings.is_empty());
    assert!(!client.contains(&a1.id));
    assert!(!client.contains(&a2.id), "late CV should be retired with the application");
    assert!(client.is_empty());
    assert!(intake.assets().pending_reconciliation().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_reports_unknown_upload_from_lost_reply() {
    let client = Arc::new(InMemoryAssetClient::new());
    client.fail_uploads([ScriptedFailure::TimedOut]);
    let intake = common::test_intake(client.clone()).await;

    let outcome = intake
        .submit(Submission::new("J1", "U1").with_cv(common::cv_file("cv.pdf")))
        .await
        .unwrap();

    let asset = outcome.application.cv_asset.clone().unwrap();
    assert!(client.contains(&asset.id));
    assert_eq!(client.len(), 2);

    let [warning] = outcome.warnings.as_slice() else {
        panic!("expected one warning, got {:?}", outcome.warnings);
    };
    assert_eq!(warning.kind, ReconciliationKind::UnknownUpload);

    let pending = intake.assets().pending_reconciliation().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, warning.id);
}

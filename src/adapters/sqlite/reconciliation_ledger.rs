//! SQLite implementation of the ReconciliationLedger.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_optional_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ReconciliationKind, ReconciliationWarning};
use crate::domain::ports::ReconciliationLedger;

#[derive(Clone)]
pub struct SqliteReconciliationLedger {
    pool: SqlitePool,
}

impl SqliteReconciliationLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReconciliationLedger for SqliteReconciliationLedger {
    async fn record(&self, warning: &ReconciliationWarning) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO asset_reconciliation (id, kind, asset_id, namespace, reason, recorded_at, resolved_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(warning.id.to_string())
        .bind(warning.kind.as_str())
        .bind(&warning.asset_id)
        .bind(&warning.namespace)
        .bind(&warning.reason)
        .bind(format_datetime(&warning.recorded_at))
        .bind(warning.resolved_at.as_ref().map(format_datetime))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn unresolved(&self) -> DomainResult<Vec<ReconciliationWarning>> {
        let rows: Vec<WarningRow> = sqlx::query_as(
            "SELECT * FROM asset_reconciliation WHERE resolved_at IS NULL ORDER BY recorded_at, rowid"
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn resolve(&self, id: Uuid) -> DomainResult<bool> {
        let result = sqlx::query(
            "UPDATE asset_reconciliation SET resolved_at = ? WHERE id = ? AND resolved_at IS NULL"
        )
        .bind(format_datetime(&Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct WarningRow {
    id: String,
    kind: String,
    asset_id: Option<String>,
    namespace: String,
    reason: String,
    recorded_at: String,
    resolved_at: Option<String>,
}

impl TryFrom<WarningRow> for ReconciliationWarning {
    type Error = DomainError;

    fn try_from(row: WarningRow) -> Result<Self, Self::Error> {
        let kind = ReconciliationKind::from_str(&row.kind)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid reconciliation kind: {}", row.kind)))?;

        Ok(ReconciliationWarning {
            id: parse_uuid(&row.id)?,
            kind,
            asset_id: row.asset_id,
            namespace: row.namespace,
            reason: row.reason,
            recorded_at: parse_datetime(&row.recorded_at)?,
            resolved_at: parse_optional_datetime(row.resolved_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::AssetRef;

    #[tokio::test]
    async fn test_record_and_resolve() {
        let pool = create_migrated_test_pool().await.unwrap();
        let ledger = SqliteReconciliationLedger::new(pool);

        let orphan = ReconciliationWarning::orphan(
            &AssetRef::new("applications/a1", "https://cdn.example/a1"),
            "applications",
            "destroy failed: HTTP 503",
        );
        let unknown = ReconciliationWarning::unknown_upload("applications", "upload timed out");
        ledger.record(&orphan).await.unwrap();
        ledger.record(&unknown).await.unwrap();

        let open = ledger.unresolved().await.unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[0], orphan);
        assert_eq!(open[1].kind, ReconciliationKind::UnknownUpload);

        assert!(ledger.resolve(orphan.id).await.unwrap());
        assert!(!ledger.resolve(orphan.id).await.unwrap());

        let open = ledger.unresolved().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, unknown.id);
    }
}

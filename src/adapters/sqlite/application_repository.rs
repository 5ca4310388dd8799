//! SQLite implementation of the ApplicationRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Application, ApplicationStatus, AssetRef};
use crate::domain::ports::{ApplicationFilter, ApplicationRepository};

#[derive(Clone)]
pub struct SqliteApplicationRepository {
    pool: SqlitePool,
}

impl SqliteApplicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for SqliteApplicationRepository {
    async fn insert(&self, application: &Application) -> DomainResult<()> {
        let cv_json = serialize_cv(application.cv_asset.as_ref())?;

        sqlx::query(
            r#"INSERT INTO applications (id, jobId, applicantId, message, cvAsset, status,
               appliedAt, createdAt, updatedAt, version)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(application.id.to_string())
        .bind(&application.job_id)
        .bind(&application.applicant_id)
        .bind(&application.message)
        .bind(cv_json)
        .bind(application.status.as_str())
        .bind(format_datetime(&application.applied_at))
        .bind(format_datetime(&application.created_at))
        .bind(format_datetime(&application.updated_at))
        .bind(application.version as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Application>> {
        let row: Option<ApplicationRow> = sqlx::query_as(
            "SELECT * FROM applications WHERE id = ?"
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        target: ApplicationStatus,
    ) -> DomainResult<Option<Application>> {
        let row: Option<ApplicationRow> = sqlx::query_as(
            r#"UPDATE applications SET status = ?, updatedAt = ?, version = version + 1
               WHERE id = ? AND status = ?
               RETURNING *"#
        )
        .bind(target.as_str())
        .bind(format_datetime(&Utc::now()))
        .bind(id.to_string())
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn compare_and_set_cv(
        &self,
        id: Uuid,
        expected: Option<&AssetRef>,
        replacement: Option<&AssetRef>,
    ) -> DomainResult<Option<Application>> {
        let row: Option<ApplicationRow> = sqlx::query_as(
            r#"UPDATE applications SET cvAsset = ?, updatedAt = ?, version = version + 1
               WHERE id = ? AND cvAsset IS ?
               RETURNING *"#
        )
        .bind(serialize_cv(replacement)?)
        .bind(format_datetime(&Utc::now()))
        .bind(id.to_string())
        .bind(serialize_cv(expected)?)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: Uuid) -> DomainResult<Option<Application>> {
        let row: Option<ApplicationRow> = sqlx::query_as(
            "DELETE FROM applications WHERE id = ? RETURNING *"
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, filter: ApplicationFilter) -> DomainResult<Vec<Application>> {
        let mut query = String::from("SELECT * FROM applications WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(job_id) = &filter.job_id {
            query.push_str(" AND jobId = ?");
            bindings.push(job_id.clone());
        }
        if let Some(applicant_id) = &filter.applicant_id {
            query.push_str(" AND applicantId = ?");
            bindings.push(applicant_id.clone());
        }
        if let Some(status) = &filter.status {
            query.push_str(" AND status = ?");
            bindings.push(status.as_str().to_string());
        }

        query.push_str(" ORDER BY appliedAt DESC, rowid DESC");

        if let Some(limit) = filter.limit {
            query.push_str(&format!(" LIMIT {}", limit.max(0)));
        }

        let mut q = sqlx::query_as::<_, ApplicationRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<ApplicationRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

fn serialize_cv(asset: Option<&AssetRef>) -> DomainResult<Option<String>> {
    asset.map(serde_json::to_string).transpose().map_err(Into::into)
}

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: String,
    #[sqlx(rename = "jobId")]
    job_id: String,
    #[sqlx(rename = "applicantId")]
    applicant_id: String,
    message: Option<String>,
    #[sqlx(rename = "cvAsset")]
    cv_asset: Option<String>,
    status: String,
    #[sqlx(rename = "appliedAt")]
    applied_at: String,
    #[sqlx(rename = "createdAt")]
    created_at: String,
    #[sqlx(rename = "updatedAt")]
    updated_at: String,
    version: i64,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = DomainError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let status = ApplicationStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid status: {}", row.status)))?;

        let cv_asset: Option<AssetRef> = row.cv_asset
            .map(|s| serde_json::from_str(&s))
            .transpose()?;

        Ok(Application {
            id: parse_uuid(&row.id)?,
            job_id: row.job_id,
            applicant_id: row.applicant_id,
            message: row.message,
            cv_asset,
            status,
            applied_at: parse_datetime(&row.applied_at)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
            version: row.version as u64,
        })
    }
}

//! Remote asset domain model.
//!
//! Assets are files (CVs) held by the remote media service. The core only
//! ever holds references to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Reference to a durable object in the media store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    /// Store-assigned identifier (public id)
    pub id: String,
    /// Public URL of the object
    pub url: String,
}

impl AssetRef {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// A file on the caller's side waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    /// Set the MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk.
    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = guess_content_type(&file_name).map(str::to_string);
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "txt" => Some("text/plain"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

/// Options passed along with an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl From<&LocalFile> for UploadOptions {
    fn from(file: &LocalFile) -> Self {
        Self {
            file_name: Some(file.file_name.clone()),
            content_type: file.content_type.clone(),
        }
    }
}

/// Result of a destroy call against the media store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestroyResult {
    Destroyed,
    NotFound,
}

/// Outcome of releasing an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseOutcome {
    /// The object existed and was deleted
    Released,
    /// The object was already gone
    AlreadyGone,
}

/// Kind of inconsistency that needs manual reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationKind {
    /// A remote object that no application references any more
    Orphan,
    /// An upload whose remote outcome is unknown (cancelled in flight)
    UnknownUpload,
}

impl ReconciliationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orphan => "orphan",
            Self::UnknownUpload => "unknown_upload",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "orphan" => Some(Self::Orphan),
            "unknown_upload" => Some(Self::UnknownUpload),
            _ => None,
        }
    }
}

/// A recorded inconsistency between application records and the media store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationWarning {
    pub id: Uuid,
    pub kind: ReconciliationKind,
    /// Remote object id, when known
    pub asset_id: Option<String>,
    /// Namespace the object lives (or may live) in
    pub namespace: String,
    /// Why the entry was recorded
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ReconciliationWarning {
    /// An old object whose cleanup failed after a replacement.
    pub fn orphan(asset: &AssetRef, namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ReconciliationKind::Orphan,
            asset_id: Some(asset.id.clone()),
            namespace: namespace.into(),
            reason: reason.into(),
            recorded_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// An upload that was cancelled before the store answered.
    pub fn unknown_upload(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ReconciliationKind::UnknownUpload,
            asset_id: None,
            namespace: namespace.into(),
            reason: reason.into(),
            recorded_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

/// Result of a successful attach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// The freshly uploaded asset
    pub asset: AssetRef,
    /// Non-fatal cleanup problems recorded along the way
    pub warnings: Vec<ReconciliationWarning>,
}

impl Attachment {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

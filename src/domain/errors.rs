//! Domain errors for the Hireflow core.

use thiserror::Error;
use uuid::Uuid;

use super::models::ApplicationStatus;

/// Errors raised while talking to the remote media store.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Transport failure or 5xx-class reply; retried internally
    #[error("Asset store unavailable: {0}")]
    StoreUnavailable(String),

    /// The request was sent but no reply arrived in time. The store may
    /// still have applied it; retried internally
    #[error("Asset store timed out: {0}")]
    StoreTimeout(String),

    /// Missing or rejected credentials, bad account configuration
    #[error("Asset store configuration error: {0}")]
    StoreConfig(String),

    /// 4xx-class reply other than auth failures
    #[error("Asset rejected by store ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The referenced object does not exist
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// The caller's deadline elapsed before the store answered
    #[error("Asset {operation} cancelled after timeout: {target}")]
    Cancelled { operation: String, target: String },

    /// The local file could not be read
    #[error("Failed to read local file: {0}")]
    LocalFile(#[from] std::io::Error),
}

impl AssetError {
    /// Classify an HTTP status returned by the store.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::StoreConfig(format!("HTTP {status}: {body}")),
            404 => Self::NotFound(body),
            408 | 429 => Self::StoreUnavailable(format!("HTTP {status}: {body}")),
            s if s >= 500 => Self::StoreUnavailable(format!("HTTP {status}: {body}")),
            s => Self::Rejected { status: s, message: body },
        }
    }

    /// Returns true if this error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::StoreTimeout(_))
    }

    /// Returns true if the store may have acted on a request it never confirmed
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::StoreTimeout(_))
    }

    /// Returns true if this is a permanent error that should not be retried
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

/// Domain-level errors that can occur in the Hireflow core.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Application not found: {0}")]
    ApplicationNotFound(Uuid),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("Concurrency conflict: application {0} was modified")]
    ConcurrencyConflict(Uuid),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Asset(#[from] AssetError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

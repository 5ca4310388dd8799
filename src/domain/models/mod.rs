pub mod application;
pub mod asset;
pub mod config;

pub use application::{Application, ApplicationStatus, NewApplication};
pub use asset::{
    AssetRef, Attachment, DestroyResult, LocalFile, ReconciliationKind, ReconciliationWarning,
    ReleaseOutcome, UploadOptions,
};
pub use config::{Config, DatabaseConfig, LoggingConfig, MediaBackend, MediaConfig, RetryConfig};

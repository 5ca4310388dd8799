//! Hireflow - job application lifecycle with remote CV assets
//!
//! Applications move through a small status machine (`pending` to
//! `reviewed`, `accepted` or `rejected`) and may reference a CV stored in a
//! remote media service. The media service can fail independently of the
//! database, so CV replacement and cleanup are coordinated to never leave an
//! application pointing at a deleted object; leftovers are recorded for
//! manual reconciliation instead.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Adapters** (`adapters`): SQLite persistence, media store clients
//! - **Service Layer** (`services`): lifecycle, asset coordination, intake
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{AssetError, DomainError, DomainResult};
pub use domain::models::{
    Application, ApplicationStatus, AssetRef, Attachment, Config, LocalFile, NewApplication,
    ReconciliationWarning, ReleaseOutcome,
};
pub use domain::ports::{
    ApplicationFilter, ApplicationRepository, ReconciliationLedger, RemoteAssetClient,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ApplicationIntake, ApplicationStore, AssetCoordinator, RetryPolicy};

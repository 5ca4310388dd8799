//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that adapters implement:
//! - ApplicationRepository: persistence for applications
//! - RemoteAssetClient: the remote media store
//! - ReconciliationLedger: record of orphaned or unknown remote objects

pub mod application_repository;
pub mod reconciliation_ledger;
pub mod remote_asset_client;

pub use application_repository::{ApplicationFilter, ApplicationRepository};
pub use reconciliation_ledger::ReconciliationLedger;
pub use remote_asset_client::RemoteAssetClient;

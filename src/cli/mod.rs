//! Command-line interface.

pub mod commands;
pub mod context;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use crate::domain::errors::{AssetError, DomainError};

/// Report a failed command and exit with a non-zero status.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let kind = match (err.downcast_ref::<DomainError>(), err.downcast_ref::<AssetError>()) {
        (Some(domain), _) => error_kind(domain),
        (None, Some(asset)) => asset_error_kind(asset),
        (None, None) => "error",
    };

    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": kind,
            "message": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}

fn error_kind(err: &DomainError) -> &'static str {
    match err {
        DomainError::Validation(_) => "validation",
        DomainError::ApplicationNotFound(_) => "not_found",
        DomainError::InvalidTransition { .. } => "invalid_transition",
        DomainError::ConcurrencyConflict(_) => "concurrency_conflict",
        DomainError::Database(_) => "database",
        DomainError::Serialization(_) => "serialization",
        DomainError::Asset(asset) => asset_error_kind(asset),
    }
}

fn asset_error_kind(err: &AssetError) -> &'static str {
    match err {
        AssetError::StoreUnavailable(_) => "asset_store_unavailable",
        AssetError::StoreTimeout(_) => "asset_store_timeout",
        AssetError::StoreConfig(_) => "asset_store_config",
        AssetError::Rejected { .. } => "asset_rejected",
        AssetError::NotFound(_) => "asset_not_found",
        AssetError::Cancelled { .. } => "asset_cancelled",
        AssetError::LocalFile(_) => "local_file",
    }
}

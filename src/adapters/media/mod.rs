//! Media store adapters implementing `RemoteAssetClient`.

pub mod http_client;
pub mod memory;

pub use http_client::HttpMediaClient;
pub use memory::{InMemoryAssetClient, ScriptedFailure};

use std::sync::Arc;

use crate::domain::errors::AssetError;
use crate::domain::models::{MediaBackend, MediaConfig};
use crate::domain::ports::RemoteAssetClient;

/// Build the configured media store client.
pub fn build_client(config: &MediaConfig) -> Result<Arc<dyn RemoteAssetClient>, AssetError> {
    match config.backend {
        MediaBackend::Http => Ok(Arc::new(HttpMediaClient::new(config)?)),
        MediaBackend::Memory => Ok(Arc::new(InMemoryAssetClient::new())),
    }
}

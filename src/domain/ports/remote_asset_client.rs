use async_trait::async_trait;

use crate::domain::errors::AssetError;
use crate::domain::models::{AssetRef, DestroyResult, UploadOptions};

/// Port to the remote media store.
///
/// Adapters map their transport failures onto [`AssetError`] so the
/// coordinator can tell retryable faults from permanent ones.
#[async_trait]
pub trait RemoteAssetClient: Send + Sync {
    /// Upload bytes under `namespace`, returning the durable reference
    async fn upload(
        &self,
        bytes: &[u8],
        namespace: &str,
        options: &UploadOptions,
    ) -> Result<AssetRef, AssetError>;

    /// Delete an object by id
    async fn destroy(&self, id: &str) -> Result<DestroyResult, AssetError>;
}

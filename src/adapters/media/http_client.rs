//! HTTP client for a Cloudinary-style media service.
//!
//! Uploads are multipart `POST {base}/v1_1/{cloud}/raw/upload`; deletes are
//! `POST {base}/v1_1/{cloud}/raw/destroy` answering `{"result": "ok"}` or
//! `{"result": "not found"}`. Requests authenticate with HTTP basic auth.
//! This adapter makes exactly one attempt per call; retries belong to the
//! asset coordinator.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::errors::AssetError;
use crate::domain::models::{AssetRef, DestroyResult, MediaConfig, UploadOptions};
use crate::domain::ports::RemoteAssetClient;

/// Media service HTTP client
pub struct HttpMediaClient {
    /// Reusable HTTP client with connection pooling
    http_client: ReqwestClient,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl HttpMediaClient {
    /// Build a client from configuration.
    ///
    /// Missing credentials are a configuration error, reported before any
    /// request is made.
    pub fn new(config: &MediaConfig) -> Result<Self, AssetError> {
        for (name, value) in [
            ("cloud_name", &config.cloud_name),
            ("api_key", &config.api_key),
            ("api_secret", &config.api_secret),
        ] {
            if value.trim().is_empty() {
                return Err(AssetError::StoreConfig(format!("media.{name} is not set")));
            }
        }

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AssetError::StoreConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/v1_1/{}/raw/{action}", self.base_url, self.cloud_name)
    }

    /// Turn a non-success response into a classified error.
    async fn error_from(response: Response) -> AssetError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error response".to_string());
        AssetError::from_status(status, body)
    }
}

fn transport_error(err: reqwest::Error) -> AssetError {
    if err.is_builder() {
        AssetError::StoreConfig(err.to_string())
    } else if err.is_timeout() {
        AssetError::StoreTimeout(err.to_string())
    } else {
        AssetError::StoreUnavailable(err.to_string())
    }
}

fn file_part(bytes: &[u8], options: &UploadOptions) -> Part {
    let file_name = options.file_name.clone().unwrap_or_else(|| "upload".to_string());
    let part = Part::bytes(bytes.to_vec()).file_name(file_name.clone());
    match options.content_type.as_deref() {
        Some(content_type) => part.mime_str(content_type).unwrap_or_else(|_| {
            Part::bytes(bytes.to_vec()).file_name(file_name)
        }),
        None => part,
    }
}

#[async_trait]
impl RemoteAssetClient for HttpMediaClient {
    async fn upload(
        &self,
        bytes: &[u8],
        namespace: &str,
        options: &UploadOptions,
    ) -> Result<AssetRef, AssetError> {
        let form = Form::new()
            .part("file", file_part(bytes, options))
            .text("folder", namespace.to_string());

        let response = self
            .http_client
            .post(self.endpoint("upload"))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AssetError::StoreUnavailable(format!("malformed upload response: {e}")))?;

        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| AssetError::StoreUnavailable("upload response carried no url".to_string()))?;

        debug!(asset_id = %body.public_id, namespace, "media service accepted upload");
        Ok(AssetRef::new(body.public_id, url))
    }

    async fn destroy(&self, id: &str) -> Result<DestroyResult, AssetError> {
        let response = self
            .http_client
            .post(self.endpoint("destroy"))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .form(&[("public_id", id)])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return match Self::error_from(response).await {
                AssetError::NotFound(_) => Ok(DestroyResult::NotFound),
                other => Err(other),
            };
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| AssetError::StoreUnavailable(format!("malformed destroy response: {e}")))?;

        match body.result.as_str() {
            "ok" => Ok(DestroyResult::Destroyed),
            "not found" => Ok(DestroyResult::NotFound),
            other => Err(AssetError::Rejected {
                status: 200,
                message: format!("unexpected destroy result: {other}"),
            }),
        }
    }
}

//! In-process media store.
//!
//! Keeps uploaded objects in memory. Failures and latency can be scripted,
//! which makes it the store of choice for tests and local development.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::errors::AssetError;
use crate::domain::models::{AssetRef, DestroyResult, UploadOptions};
use crate::domain::ports::RemoteAssetClient;

/// A failure the in-memory store can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// Transient outage (maps to `StoreUnavailable`)
    Unavailable,
    /// Bad credentials (maps to `StoreConfig`)
    Config,
    /// Request refused with the given 4xx status
    Rejected(u16),
    /// The store acts on the request but the reply is lost (maps to `StoreTimeout`)
    TimedOut,
}

impl ScriptedFailure {
    fn into_error(self, operation: &str) -> AssetError {
        match self {
            Self::Unavailable => AssetError::StoreUnavailable(format!("scripted {operation} outage")),
            Self::Config => AssetError::StoreConfig(format!("scripted {operation} credential failure")),
            Self::Rejected(status) => AssetError::Rejected {
                status,
                message: format!("scripted {operation} rejection"),
            },
            Self::TimedOut => AssetError::StoreTimeout(format!("scripted {operation} reply lost")),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    url: String,
}

#[derive(Default)]
struct Script {
    upload_failures: VecDeque<ScriptedFailure>,
    destroy_failures: VecDeque<ScriptedFailure>,
}

/// Media store that lives in process memory.
pub struct InMemoryAssetClient {
    objects: Mutex<HashMap<String, StoredObject>>,
    script: Mutex<Script>,
    next_id: AtomicU64,
    upload_calls: AtomicU64,
    destroy_calls: AtomicU64,
    upload_delay: Option<Duration>,
    base_url: String,
}

impl InMemoryAssetClient {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            script: Mutex::new(Script::default()),
            next_id: AtomicU64::new(1),
            upload_calls: AtomicU64::new(0),
            destroy_calls: AtomicU64::new(0),
            upload_delay: None,
            base_url: "memory://assets".to_string(),
        }
    }

    /// Delay every upload, to exercise caller timeouts.
    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = Some(delay);
        self
    }

    /// Make the next upload attempts fail, in order.
    pub fn fail_uploads(&self, failures: impl IntoIterator<Item = ScriptedFailure>) {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script.upload_failures.extend(failures);
    }

    /// Make the next destroy attempts fail, in order.
    pub fn fail_destroys(&self, failures: impl IntoIterator<Item = ScriptedFailure>) {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script.destroy_failures.extend(failures);
    }

    /// Whether an object with this id is currently stored.
    pub fn contains(&self, id: &str) -> bool {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).contains_key(id)
    }

    /// Stored bytes for an id.
    pub fn bytes_of(&self, id: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .map(|o| o.bytes.clone())
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upload attempts seen so far, failed ones included.
    pub fn upload_calls(&self) -> u64 {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Destroy attempts seen so far, failed ones included.
    pub fn destroy_calls(&self) -> u64 {
        self.destroy_calls.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryAssetClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteAssetClient for InMemoryAssetClient {
    async fn upload(
        &self,
        bytes: &[u8],
        namespace: &str,
        options: &UploadOptions,
    ) -> Result<AssetRef, AssetError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.upload_delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .upload_failures
            .pop_front();
        if let Some(failure) = scripted.filter(|f| *f != ScriptedFailure::TimedOut) {
            return Err(failure.into_error("upload"));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("{namespace}/a{n}");
        let extension = options
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| format!(".{ext}"))
            .unwrap_or_default();
        let url = format!("{}/{id}{extension}", self.base_url);

        self.objects.lock().unwrap_or_else(|e| e.into_inner()).insert(
            id.clone(),
            StoredObject {
                bytes: bytes.to_vec(),
                url: url.clone(),
            },
        );

        if let Some(lost) = scripted {
            return Err(lost.into_error("upload"));
        }
        Ok(AssetRef::new(id, url))
    }

    async fn destroy(&self, id: &str) -> Result<DestroyResult, AssetError> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .destroy_failures
            .pop_front();
        if let Some(failure) = scripted.filter(|f| *f != ScriptedFailure::TimedOut) {
            return Err(failure.into_error("destroy"));
        }

        let removed = self.objects.lock().unwrap_or_else(|e| e.into_inner()).remove(id);
        if let Some(lost) = scripted {
            return Err(lost.into_error("destroy"));
        }
        Ok(match removed {
            Some(object) => {
                tracing::trace!(asset_id = id, url = %object.url, "in-memory object destroyed");
                DestroyResult::Destroyed
            }
            None => DestroyResult::NotFound,
        })
    }
}

//! Object storage the captured images are written to.

use async_trait::async_trait;
use opendal::{Operator, services};
use tracing::{debug, info, warn};

use crate::config::StorageConfig;

/// Errors from the blob store.
#[derive(Debug)]
pub enum StorageError {
    /// No bucket has been configured.
    NotConfigured,
    /// The backend could not be built from its configuration.
    Init(String),
    /// The backend rejected an operation.
    Backend(opendal::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "Object storage bucket is not configured"),
            Self::Init(err) => write!(f, "Failed to initialize object storage: {err}"),
            Self::Backend(err) => write!(f, "Object storage error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        Self::Backend(err)
    }
}

/// Key-addressed, write-once object storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `data` under `key`, replacing nothing the caller cares about.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    /// Name used in log lines, usually the bucket.
    fn location(&self) -> &str;
}

/// [`BlobStore`] backed by an OpenDAL operator.
#[derive(Clone, Debug)]
pub struct OpendalStore {
    operator: Operator,
    location: String,
}

impl OpendalStore {
    /// Wraps an existing operator, `location` is only used for logging.
    pub fn new(operator: Operator, location: impl Into<String>) -> Self {
        Self {
            operator,
            location: location.into(),
        }
    }

    /// Builds an S3 operator for `config`.
    pub fn s3(config: &StorageConfig) -> Result<Self, StorageError> {
        let bucket = config.bucket.as_deref().ok_or(StorageError::NotConfigured)?;
        let mut builder = services::S3::default().bucket(bucket).region(&config.region);

        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint(endpoint);
        }
        if let Some(ref access_key_id) = config.access_key_id {
            builder = builder.access_key_id(access_key_id);
        }
        if let Some(ref secret_access_key) = config.secret_access_key {
            builder = builder.secret_access_key(secret_access_key);
        }

        let operator = Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|err| StorageError::Init(err.to_string()))?;
        info!(
            "Object storage initialized for bucket {} (endpoint {})",
            bucket,
            config.endpoint.as_deref().unwrap_or("default")
        );
        Ok(Self::new(operator, bucket))
    }
}

#[async_trait]
impl BlobStore for OpendalStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let size = data.len();
        debug!("Writing {} ({} bytes) to {}", key, size, self.location);
        if self.operator.info().full_capability().write_with_content_type {
            self.operator
                .write_with(key, data)
                .content_type(content_type)
                .await?;
        } else {
            self.operator.write(key, data).await?;
        }
        debug!("Wrote {} to {}", key, self.location);
        Ok(())
    }

    fn location(&self) -> &str {
        &self.location
    }
}

/// [`BlobStore`] used when no bucket is configured; every write fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredStore;

#[async_trait]
impl BlobStore for UnconfiguredStore {
    async fn put(&self, key: &str, _data: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        warn!("Dropping write of {key}, no bucket configured");
        Err(StorageError::NotConfigured)
    }

    fn location(&self) -> &str {
        "<unconfigured>"
    }
}

/// Builds the store for `config`, falling back to [`UnconfiguredStore`] without a bucket.
pub fn from_config(config: &StorageConfig) -> Result<std::sync::Arc<dyn BlobStore>, StorageError> {
    match OpendalStore::s3(config) {
        Ok(store) => Ok(std::sync::Arc::new(store)),
        Err(StorageError::NotConfigured) => {
            warn!("S3_BUCKET_NAME is not set, generated images will not be persisted");
            Ok(std::sync::Arc::new(UnconfiguredStore))
        }
        Err(err) => Err(err),
    }
}

#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use async_trait::async_trait;
use std::sync::Arc;
use unzipper_core::Config;

/// Builds a storage client for a bucket resolved at request time.
///
/// The handler only learns the bucket from the triggering event, so clients
/// are created per call instead of once at startup.
#[async_trait]
pub trait StorageFactory: Send + Sync {
    async fn for_bucket(&self, bucket: &str) -> StorageResult<Arc<dyn Storage>>;
}

/// Factory that builds backends from the application configuration
#[derive(Clone)]
pub struct ConfigStorageFactory {
    config: Arc<Config>,
}

impl ConfigStorageFactory {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StorageFactory for ConfigStorageFactory {
    async fn for_bucket(&self, bucket: &str) -> StorageResult<Arc<dyn Storage>> {
        create_storage(&self.config, bucket).await
    }
}

/// Create a storage backend for `bucket` based on configuration
pub async fn create_storage(config: &Config, bucket: &str) -> StorageResult<Arc<dyn Storage>> {
    if bucket.is_empty() || bucket.contains('/') || bucket == ".." {
        return Err(StorageError::ConfigError(format!(
            "Invalid bucket name: {:?}",
            bucket
        )));
    }

    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let storage = S3Storage::new(
                bucket.to_string(),
                config.region.clone(),
                config.s3_endpoint(),
                &config.credentials,
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.as_ref().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path.join(bucket)).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        // A fresh map would never contain the source archive.
        StorageBackend::Memory => Err(StorageError::ConfigError(
            "Memory storage backend cannot be created from configuration".to_string(),
        )),
    }
}

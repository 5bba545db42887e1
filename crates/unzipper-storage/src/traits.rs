//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;
use unzipper_core::ErrorMetadata;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ErrorMetadata for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            StorageError::UploadFailed(_) => "UPLOAD_FAILED",
            StorageError::DownloadFailed(_) => "DOWNLOAD_FAILED",
            StorageError::NotFound(_) => "NOT_FOUND",
            StorageError::InvalidKey(_) => "INVALID_KEY",
            StorageError::BackendError(_) => "STORAGE_BACKEND_ERROR",
            StorageError::IoError(_) => "IO_ERROR",
            StorageError::ConfigError(_) => "STORAGE_CONFIG_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::UploadFailed(_)
                | StorageError::DownloadFailed(_)
                | StorageError::BackendError(_)
                | StorageError::IoError(_)
        )
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Stream of object chunks returned by [`Storage::download_stream`].
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Storage abstraction trait
///
/// All storage backends (S3-compatible, local filesystem, memory) implement this
/// trait. The extraction engine only sees `Arc<dyn Storage>` and never the
/// concrete transport; retries and timeouts are the backend's business.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload data to a specific storage key with the given content type.
    /// Returns the URL of the uploaded object.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Download a file as a stream (for large files)
    ///
    /// The stream yields `Bytes` chunks as they become available, so archives can
    /// be staged on disk without holding them in memory.
    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

use std::sync::Mutex;

use async_trait::async_trait;
use unzipper_storage::{
    ByteStream, MemoryStorage, Storage, StorageBackend, StorageError, StorageResult,
};

/// Memory storage that records every upload attempt and fails chosen keys
#[derive(Default)]
pub struct RecordingStorage {
    pub inner: MemoryStorage,
    fail_keys: Vec<String>,
    attempts: Mutex<Vec<String>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(keys: &[&str]) -> Self {
        Self {
            fail_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        self.attempts.lock().unwrap().push(storage_key.to_string());
        if self.fail_keys.iter().any(|k| k == storage_key) {
            return Err(StorageError::UploadFailed(format!(
                "simulated failure for {}",
                storage_key
            )));
        }
        self.inner.upload_with_key(storage_key, data, content_type).await
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.inner.download(storage_key).await
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        self.inner.download_stream(storage_key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

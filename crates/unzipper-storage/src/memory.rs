//! In-memory storage implementation
//!
//! Keeps every object in a map guarded by a mutex. Used by tests and by
//! embedders that want to run an extraction without any transport.

use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// An object held by [`MemoryStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Memory storage; clones share the same objects.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<Mutex<BTreeMap<String, StoredObject>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, StoredObject>> {
        // A poisoned map is still consistent: every write is a single insert.
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Put an object directly, bypassing the `Storage` trait
    pub fn insert(&self, key: &str, data: Vec<u8>, content_type: &str) {
        self.lock().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
    }

    /// Get an object (for assertions)
    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.lock().get(key).cloned()
    }

    /// All keys in lexicographic order
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let size = data.len();
        self.insert(storage_key, data, content_type);
        tracing::debug!(key = %storage_key, size_bytes = size, "Memory storage upload successful");
        Ok(format!("memory://{}", storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.get(storage_key)
            .map(|object| object.data)
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let data = self.download(storage_key).await?;
        Ok(Box::pin(stream::once(async move {
            Ok::<_, StorageError>(Bytes::from(data))
        })))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.lock().contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use unzipper_core::Config;
use unzipper_handler::ArchiveHandler;
use unzipper_storage::{MemoryStorage, Storage, StorageFactory, StorageResult};
use zip::write::{FileOptions, ZipWriter};

/// Factory that hands out one shared in-memory bucket and records requests
#[derive(Default)]
pub struct FixedStorageFactory {
    pub storage: MemoryStorage,
    requested: Mutex<Vec<String>>,
}

impl FixedStorageFactory {
    pub fn requested_buckets(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageFactory for FixedStorageFactory {
    async fn for_bucket(&self, bucket: &str) -> StorageResult<Arc<dyn Storage>> {
        self.requested.lock().unwrap().push(bucket.to_string());
        Ok(Arc::new(self.storage.clone()))
    }
}

pub struct TestHandler {
    pub handler: ArchiveHandler,
    pub factory: Arc<FixedStorageFactory>,
    pub staging_dir: TempDir,
}

impl TestHandler {
    pub fn storage(&self) -> &MemoryStorage {
        &self.factory.storage
    }

    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Handler over an in-memory bucket; `vars` are extra environment variables
pub fn setup_handler(vars: &[(&str, &str)]) -> TestHandler {
    let staging_dir = tempfile::tempdir().expect("create staging dir");
    let mut env: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    env.insert(
        "STAGING_DIR".to_string(),
        staging_dir.path().to_string_lossy().into_owned(),
    );

    let config = Config::from_vars(|name| env.get(name).cloned()).expect("valid config");
    let factory = Arc::new(FixedStorageFactory::default());
    let handler = ArchiveHandler::new(Arc::new(config), factory.clone());

    TestHandler {
        handler,
        factory,
        staging_dir,
    }
}

/// Build an in-memory zip archive of `(name, data)` files
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(*name, FileOptions::default())
            .expect("start file");
        writer.write_all(data).expect("write entry");
    }
    writer.finish().expect("finish archive").into_inner()
}

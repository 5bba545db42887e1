pub mod archives;
pub mod storage;

use std::sync::Arc;

use tempfile::TempDir;
use unzipper_extract::{ExtractSettings, Extractor, StagingArea};
use unzipper_storage::Storage;

/// Extractor over `storage` with its own staging directory
pub struct TestExtractor {
    pub extractor: Extractor,
    pub staging_dir: TempDir,
}

impl TestExtractor {
    /// Number of files left behind in the staging directory
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

pub fn setup_extractor(storage: Arc<dyn Storage>, max_depth: u32, max_workers: usize) -> TestExtractor {
    let staging_dir = tempfile::tempdir().expect("create staging dir");
    let settings = ExtractSettings {
        max_workers,
        max_depth,
        ..ExtractSettings::default()
    };
    let extractor = Extractor::new(storage, settings, StagingArea::new(staging_dir.path()));

    TestExtractor {
        extractor,
        staging_dir,
    }
}

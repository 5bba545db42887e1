//! Depth-bounded recursive extraction.
//!
//! One call to [`Extractor::process`] handles one archive level:
//!
//! `OPEN -> CLASSIFY_ENTRIES -> DISPATCH_UPLOADS -> BARRIER -> RECURSE_NESTED -> AGGREGATE`
//!
//! Entries are read from a single sequential pass. File entries fan out to the
//! level's [`UploadScheduler`]; nested archives are held back and processed one
//! at a time, each fully (including its own children) before the next sibling,
//! only after every upload of the current level has finished.

use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use unzipper_core::constants::NESTED_ARCHIVE_EXTENSION;
use unzipper_core::Config;
use unzipper_storage::{join_key, Storage};
use zip::ZipArchive;

use crate::classify::{is_directory, EntryAttrs};
use crate::error::{ExtractError, ExtractResult};
use crate::result::LevelResult;
use crate::sanitize::{is_directory_marker, is_safe, normalize, SanitizedPath};
use crate::scheduler::{UploadScheduler, UploadTask};
use crate::staging::StagingArea;

/// Tunables for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractSettings {
    /// Upload workers per archive level.
    pub max_workers: usize,
    /// Budget handed to the top-level archive.
    pub max_depth: u32,
    /// Lowercase extension, with dot, of archives to recurse into.
    pub nested_extension: String,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            max_workers: unzipper_core::constants::DEFAULT_MAX_WORKERS,
            max_depth: unzipper_core::constants::DEFAULT_MAX_RECURSION_DEPTH,
            nested_extension: NESTED_ARCHIVE_EXTENSION.to_string(),
        }
    }
}

impl ExtractSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_workers: config.max_workers,
            max_depth: config.max_recursion_depth,
            ..Self::default()
        }
    }
}

/// A nested archive found at the current level, waiting for the barrier.
#[derive(Debug)]
pub struct NestedArchiveJob {
    /// Sanitized entry path, used for logging and the staged file name.
    pub name: SanitizedPath,
    pub data: Vec<u8>,
    /// `join(current prefix, name without its extension)`.
    pub dest_prefix: String,
}

/// What the walker decided for one entry.
enum EntryPlan {
    Skip,
    Upload(UploadTask),
    Nested(NestedArchiveJob),
}

pub struct Extractor {
    storage: Arc<dyn Storage>,
    settings: ExtractSettings,
    staging: StagingArea,
}

impl Extractor {
    pub fn new(storage: Arc<dyn Storage>, settings: ExtractSettings, staging: StagingArea) -> Self {
        Self {
            storage,
            settings,
            staging,
        }
    }

    pub fn settings(&self) -> &ExtractSettings {
        &self.settings
    }

    /// Extract a staged archive file into `dest_prefix` with the configured budget.
    pub async fn extract_file(&self, path: &Path, dest_prefix: &str) -> ExtractResult<LevelResult> {
        let data = tokio::fs::read(path).await?;
        self.extract_bytes(data, dest_prefix).await
    }

    /// Extract an in-memory archive into `dest_prefix` with the configured budget.
    pub async fn extract_bytes(&self, data: Vec<u8>, dest_prefix: &str) -> ExtractResult<LevelResult> {
        let start = Instant::now();
        let result = self.process(data, dest_prefix, self.settings.max_depth).await?;

        tracing::info!(
            dest_prefix = %dest_prefix,
            files_uploaded = result.files_uploaded,
            nested_archives_processed = result.nested_archives_processed,
            max_depth_reached = result.max_depth_reached,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Archive extraction completed"
        );
        Ok(result)
    }

    /// Process one archive level with `budget` levels remaining.
    ///
    /// A budget of zero returns immediately with the depth flag set and
    /// without opening the archive.
    pub fn process<'a>(
        &'a self,
        data: Vec<u8>,
        dest_prefix: &'a str,
        budget: u32,
    ) -> BoxFuture<'a, ExtractResult<LevelResult>> {
        Box::pin(self.process_level(data, dest_prefix, budget))
    }

    #[tracing::instrument(skip(self, data), fields(size_bytes = data.len()))]
    async fn process_level(
        &self,
        data: Vec<u8>,
        dest_prefix: &str,
        budget: u32,
    ) -> ExtractResult<LevelResult> {
        if budget == 0 {
            tracing::debug!("Recursion budget exhausted; archive not opened");
            return Ok(LevelResult::depth_exhausted());
        }

        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut scheduler = UploadScheduler::new(self.storage.clone(), self.settings.max_workers);
        let mut nested_jobs = Vec::new();

        let walked = self
            .walk_entries(&mut archive, dest_prefix, &mut scheduler, &mut nested_jobs)
            .await;
        // In-flight uploads always run to completion before the level reports back.
        let barrier = scheduler.wait_all().await;
        walked?;
        let uploaded = barrier?;
        drop(archive);

        let mut result = LevelResult::with_uploads(uploaded);
        let truncated = budget <= 1 && !nested_jobs.is_empty();

        for job in nested_jobs {
            let name = job.name.clone();
            let nested_prefix = job.dest_prefix.clone();
            match self.process_nested(job, budget - 1).await {
                Ok(child) => result = result.fold(child),
                Err(e) => {
                    tracing::warn!(
                        nested_archive = %name,
                        dest_prefix = %nested_prefix,
                        error = %e,
                        "Failed to process nested archive; continuing with siblings"
                    );
                }
            }
        }

        result.max_depth_reached |= truncated;
        Ok(result)
    }

    /// Single sequential pass over the entries of one archive.
    async fn walk_entries(
        &self,
        archive: &mut ZipArchive<Cursor<Vec<u8>>>,
        dest_prefix: &str,
        scheduler: &mut UploadScheduler,
        nested_jobs: &mut Vec<NestedArchiveJob>,
    ) -> ExtractResult<()> {
        for index in 0..archive.len() {
            match self.plan_entry(archive, index, dest_prefix)? {
                EntryPlan::Skip => {}
                EntryPlan::Upload(task) => scheduler.submit(task).await?,
                EntryPlan::Nested(job) => nested_jobs.push(job),
            }
        }
        Ok(())
    }

    /// Classify, validate and read one entry.
    ///
    /// Checks run in a fixed order: directory, then name safety, then the
    /// nested-archive extension. Payloads of skipped entries are never read.
    fn plan_entry(
        &self,
        archive: &mut ZipArchive<Cursor<Vec<u8>>>,
        index: usize,
        dest_prefix: &str,
    ) -> ExtractResult<EntryPlan> {
        let mut file = archive.by_index(index)?;
        let raw_name = file.name().to_string();

        if is_directory(&EntryAttrs::from_zip(&file)) || is_directory_marker(&raw_name) {
            return Ok(EntryPlan::Skip);
        }

        if !is_safe(&raw_name) {
            tracing::debug!(entry = %raw_name, "Skipping entry with unsafe path");
            return Ok(EntryPlan::Skip);
        }

        let path = normalize(&raw_name);
        if path.is_empty() {
            return Ok(EntryPlan::Skip);
        }

        let mut data = Vec::with_capacity(file.size().min(64 * 1024 * 1024) as usize);
        file.read_to_end(&mut data)
            .map_err(|source| ExtractError::EntryRead {
                name: raw_name.clone(),
                source,
            })?;

        let nested_stem = path
            .strip_extension(&self.settings.nested_extension)
            .map(str::to_string);
        match nested_stem {
            Some(stem) => Ok(EntryPlan::Nested(NestedArchiveJob {
                dest_prefix: join_key(dest_prefix, &stem),
                name: path,
                data,
            })),
            None => Ok(EntryPlan::Upload(UploadTask::new(dest_prefix, &path, data))),
        }
    }

    /// Stage one nested archive, recurse into it, and always release the stage.
    async fn process_nested(&self, job: NestedArchiveJob, budget: u32) -> ExtractResult<LevelResult> {
        let NestedArchiveJob {
            name,
            data,
            dest_prefix,
        } = job;

        let staged = self.staging.stage(&data, name.as_str()).await?;
        drop(data);

        let outcome = match staged.read().await {
            Ok(bytes) => self.process(bytes, &dest_prefix, budget).await,
            Err(e) => Err(ExtractError::Staging(e)),
        };

        staged.release();
        outcome
    }
}

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use unzipper_core::{Config, ErrorMetadata};
use unzipper_extract::{ExtractSettings, Extractor, LevelResult, StagedArchive, StagingArea};
use unzipper_storage::{ConfigStorageFactory, Storage, StorageFactory};

use crate::error::{HandlerError, HandlerResult};
use crate::event::{destination_prefix, resolve_bucket, select_archive, CosEvent};
use crate::response::HandlerResponse;

const MISSING_BUCKET: &str = "COS_BUCKET not set and not found in event";

/// Handles COS PutObject notifications.
pub struct ArchiveHandler {
    config: Arc<Config>,
    factory: Arc<dyn StorageFactory>,
}

impl ArchiveHandler {
    pub fn new(config: Arc<Config>, factory: Arc<dyn StorageFactory>) -> Self {
        Self { config, factory }
    }

    /// Handler whose storage clients are built from `config`.
    pub fn from_config(config: Arc<Config>) -> Self {
        let factory = Arc::new(ConfigStorageFactory::new(config.clone()));
        Self::new(config, factory)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process one event. Failures are reported in the response, never returned.
    pub async fn handle(&self, event: &CosEvent) -> HandlerResponse {
        if event.records().is_empty() {
            return HandlerResponse::no_records();
        }

        let selection = select_archive(event, &self.config);
        let Some(bucket) = selection.bucket else {
            tracing::warn!("{}", MISSING_BUCKET);
            return HandlerResponse::from_error(&HandlerError::Config(MISSING_BUCKET.to_string()));
        };
        let Some(source_key) = selection.archive_key else {
            tracing::info!(
                bucket = %bucket,
                keys_seen = selection.seen.len(),
                "No archive under input prefix; ignoring event"
            );
            return HandlerResponse::no_archive(
                selection.seen,
                bucket,
                self.config.input_prefix.clone(),
            );
        };

        let output_prefix = destination_prefix(&self.config.output_prefix, &source_key);
        let target_bucket = resolve_bucket(&bucket, &selection.seen, self.config.cos_bucket.as_deref());

        match self.process(&target_bucket, &source_key, &output_prefix).await {
            Ok(result) => HandlerResponse::Ok {
                bucket,
                source_key,
                output_prefix,
                result,
            },
            Err(e) => {
                tracing::error!(
                    bucket = %target_bucket,
                    source_key = %source_key,
                    error = %e,
                    error_code = e.error_code(),
                    "Archive extraction failed"
                );
                HandlerResponse::from_error(&e)
            }
        }
    }

    async fn process(
        &self,
        bucket: &str,
        source_key: &str,
        output_prefix: &str,
    ) -> HandlerResult<LevelResult> {
        let start = Instant::now();
        let storage = self.factory.for_bucket(bucket).await?;
        let staging = StagingArea::new(&self.config.staging_dir);

        let staged = download_to_stage(storage.as_ref(), source_key, &staging).await?;
        let extractor = Extractor::new(
            storage,
            ExtractSettings::from_config(&self.config),
            staging,
        );
        let outcome = extractor.extract_file(staged.path(), output_prefix).await;
        staged.release();
        let result = outcome?;

        tracing::info!(
            bucket = %bucket,
            source_key = %source_key,
            output_prefix = %output_prefix,
            files_uploaded = result.files_uploaded,
            nested_archives_processed = result.nested_archives_processed,
            max_depth_reached = result.max_depth_reached,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Archive processed"
        );
        Ok(result)
    }
}

/// Stream `key` into a freshly reserved staged file.
async fn download_to_stage(
    storage: &dyn Storage,
    key: &str,
    staging: &StagingArea,
) -> HandlerResult<StagedArchive> {
    let staged = staging.reserve(key).await?;
    let mut stream = storage.download_stream(key).await?;
    let mut file = tokio::fs::File::create(staged.path()).await?;
    let mut size = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        size += chunk.len();
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    tracing::debug!(key = %key, size_bytes = size, path = %staged.path().display(), "Archive staged");
    Ok(staged)
}

//! Bounded concurrent uploads for one archive level.
//!
//! A scheduler is created per level and consumed by [`UploadScheduler::wait_all`],
//! so the worker pool never outlives the entries of the level that filled it.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use unzipper_storage::{join_key, Storage};

use crate::content_type::content_type_for;
use crate::error::{ExtractError, ExtractResult};
use crate::sanitize::SanitizedPath;

/// One file entry on its way to storage.
#[derive(Debug)]
pub struct UploadTask {
    pub key: String,
    pub data: Vec<u8>,
    pub content_type: String,
}

impl UploadTask {
    /// Destination key is `prefix/path`; content type is guessed from the path.
    pub fn new(prefix: &str, path: &SanitizedPath, data: Vec<u8>) -> Self {
        Self {
            key: join_key(prefix, path.as_str()),
            data,
            content_type: content_type_for(path.as_str()),
        }
    }
}

struct Dispatched {
    key: String,
    handle: JoinHandle<ExtractResult<()>>,
}

pub struct UploadScheduler {
    storage: Arc<dyn Storage>,
    semaphore: Arc<Semaphore>,
    dispatched: Vec<Dispatched>,
}

impl UploadScheduler {
    pub fn new(storage: Arc<dyn Storage>, max_workers: usize) -> Self {
        Self {
            storage,
            semaphore: Arc::new(Semaphore::new(max_workers.max(1))),
            dispatched: Vec::new(),
        }
    }

    /// Number of uploads submitted so far.
    pub fn len(&self) -> usize {
        self.dispatched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatched.is_empty()
    }

    /// Dispatch an upload, waiting for a free worker first.
    ///
    /// Fails without dispatching when no worker can ever become free.
    pub async fn submit(&mut self, task: UploadTask) -> ExtractResult<()> {
        let permit = match self.semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                return Err(ExtractError::UploadAborted {
                    key: task.key,
                    message: e.to_string(),
                })
            }
        };
        let storage = self.storage.clone();
        let key = task.key.clone();

        let handle = tokio::spawn(async move {
            let _permit = permit;
            let start = Instant::now();
            let size = task.data.len();

            storage
                .upload_with_key(&task.key, task.data, &task.content_type)
                .await
                .map_err(|source| ExtractError::Upload {
                    key: task.key.clone(),
                    source,
                })?;

            tracing::debug!(
                key = %task.key,
                content_type = %task.content_type,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Entry uploaded"
            );
            Ok(())
        });

        self.dispatched.push(Dispatched { key, handle });
        Ok(())
    }

    /// Barrier: wait for every dispatched upload to finish.
    ///
    /// All uploads are awaited even after one fails; the first failure (in
    /// submission order) is returned. Returns the number of uploaded files.
    pub async fn wait_all(self) -> ExtractResult<usize> {
        let total = self.dispatched.len();
        let mut first_error = None;
        let mut failed = 0usize;

        for Dispatched { key, handle } in self.dispatched {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(join_error) => Err(ExtractError::UploadAborted {
                    key,
                    message: join_error.to_string(),
                }),
            };

            if let Err(e) = outcome {
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => {
                tracing::error!(
                    total_uploads = total,
                    failed_uploads = failed,
                    error = %e,
                    "Upload barrier observed failures"
                );
                Err(e)
            }
            None => Ok(total),
        }
    }
}

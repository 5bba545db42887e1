use std::io;

use thiserror::Error;
use unzipper_core::ErrorMetadata;
use unzipper_storage::StorageError;

/// Failures of one archive level.
///
/// Unsafe entry names are not errors: they are skipped silently.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The archive cannot be opened or an entry cannot be decoded.
    #[error("failed to read archive: {0}")]
    ArchiveRead(#[from] zip::result::ZipError),

    /// An entry's payload could not be read from the archive stream.
    #[error("failed to read entry '{name}': {source}")]
    EntryRead {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A single upload failed; siblings already uploaded are kept.
    #[error("upload of '{key}' failed: {source}")]
    Upload {
        key: String,
        #[source]
        source: StorageError,
    },

    /// An upload task panicked or was cancelled by the runtime.
    #[error("upload task for '{key}' did not complete: {message}")]
    UploadAborted { key: String, message: String },

    /// A nested archive or a downloaded archive could not be staged locally.
    #[error("staging failed: {0}")]
    Staging(#[from] io::Error),
}

impl ErrorMetadata for ExtractError {
    fn error_code(&self) -> &'static str {
        match self {
            ExtractError::ArchiveRead(_) | ExtractError::EntryRead { .. } => "ARCHIVE_READ_ERROR",
            ExtractError::Upload { .. } | ExtractError::UploadAborted { .. } => "UPLOAD_ERROR",
            ExtractError::Staging(_) => "STAGING_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            ExtractError::ArchiveRead(_) | ExtractError::EntryRead { .. } => false,
            ExtractError::Upload { source, .. } => source.is_recoverable(),
            ExtractError::UploadAborted { .. } | ExtractError::Staging(_) => true,
        }
    }
}

pub type ExtractResult<T> = Result<T, ExtractError>;

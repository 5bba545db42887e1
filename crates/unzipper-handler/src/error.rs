use std::io;

use thiserror::Error;
use unzipper_core::ErrorMetadata;
use unzipper_extract::ExtractError;
use unzipper_storage::StorageError;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("failed to stage archive: {0}")]
    Staging(#[from] io::Error),
}

impl ErrorMetadata for HandlerError {
    fn error_code(&self) -> &'static str {
        match self {
            HandlerError::Config(_) => "CONFIG_ERROR",
            HandlerError::Storage(e) => e.error_code(),
            HandlerError::Extract(e) => e.error_code(),
            HandlerError::Staging(_) => "STAGING_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            HandlerError::Config(_) => false,
            HandlerError::Storage(e) => e.is_recoverable(),
            HandlerError::Extract(e) => e.is_recoverable(),
            HandlerError::Staging(_) => true,
        }
    }
}

pub type HandlerResult<T> = Result<T, HandlerError>;

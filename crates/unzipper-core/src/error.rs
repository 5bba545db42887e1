//! Error metadata shared by every crate's error type.
//!
//! Each crate keeps its own `thiserror` enum; this trait lets the handler turn
//! any of them into a structured failure without knowing the concrete type.

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "ARCHIVE_READ_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (the same call could succeed if retried)
    fn is_recoverable(&self) -> bool;
}

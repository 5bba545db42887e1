//! Unzipper Core Library
//!
//! This crate provides configuration, shared constants and error metadata
//! that are used across all Unzipper components.

pub mod config;
pub mod constants;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::ErrorMetadata;
pub use storage_types::StorageBackend;

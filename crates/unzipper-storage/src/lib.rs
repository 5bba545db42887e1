//! Unzipper Storage Library
//!
//! This crate provides the object store client used by the extraction engine.
//! A `Storage` instance is bound to one bucket; keys are plain `/`-delimited
//! object names.
//!
//! Keys must not contain a `..` segment or a leading `/`. Key joining is
//! centralized in the `keys` module so every caller builds keys the same way.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_storage, ConfigStorageFactory, StorageFactory};
pub use keys::join_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
pub use unzipper_core::StorageBackend;

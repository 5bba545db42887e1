//! Recursive zip extraction into object storage.
//!
//! An [`Extractor`] opens one archive, uploads its files concurrently under a
//! destination prefix and then descends into nested `.zip` entries, one at a
//! time, until the recursion budget runs out.

pub mod classify;
pub mod content_type;
pub mod error;
pub mod extractor;
pub mod result;
pub mod sanitize;
pub mod scheduler;
pub mod staging;

pub use classify::{is_directory, EntryAttributes, EntryAttrs};
pub use content_type::content_type_for;
pub use error::{ExtractError, ExtractResult};
pub use extractor::{ExtractSettings, Extractor, NestedArchiveJob};
pub use result::LevelResult;
pub use sanitize::{is_directory_marker, is_safe, normalize, SanitizedPath};
pub use scheduler::{UploadScheduler, UploadTask};
pub use staging::{StagedArchive, StagingArea};

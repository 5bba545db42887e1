//! Defaults shared by the extraction engine and the handler.

/// Upload workers per archive level.
pub const DEFAULT_MAX_WORKERS: usize = 16;

/// Recursion budget handed to the top-level archive.
pub const DEFAULT_MAX_RECURSION_DEPTH: u32 = 10;

pub const DEFAULT_REGION: &str = "ap-guangzhou";

pub const DEFAULT_INPUT_PREFIX: &str = "uploads/";

pub const DEFAULT_OUTPUT_PREFIX: &str = "extracted/";

/// Content type used when nothing better can be guessed from a file name.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension (lowercase, with dot) of archives that are recursed into
/// instead of being uploaded.
pub const NESTED_ARCHIVE_EXTENSION: &str = ".zip";

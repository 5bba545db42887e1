//! Per-level extraction counts and how they are folded together.

use serde::Serialize;

/// Counts produced by one archive level, including everything below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelResult {
    pub files_uploaded: usize,
    /// Nested archives handled at or below this level. A level does not count
    /// itself; its parent does when folding it in.
    pub nested_archives_processed: usize,
    /// The recursion budget ran out while nested archives remained.
    pub max_depth_reached: bool,
}

impl LevelResult {
    /// Result of a level that was not opened because its budget was spent.
    pub fn depth_exhausted() -> Self {
        Self {
            max_depth_reached: true,
            ..Self::default()
        }
    }

    pub fn with_uploads(files_uploaded: usize) -> Self {
        Self {
            files_uploaded,
            ..Self::default()
        }
    }

    /// Fold a successfully processed child archive into this result.
    #[must_use]
    pub fn fold(self, child: LevelResult) -> Self {
        Self {
            files_uploaded: self.files_uploaded + child.files_uploaded,
            nested_archives_processed: self.nested_archives_processed
                + 1
                + child.nested_archives_processed,
            max_depth_reached: self.max_depth_reached || child.max_depth_reached,
        }
    }
}

//! Local staging for archives waiting to be opened.
//!
//! Every staged file is removed when its [`StagedArchive`] is released or
//! dropped, on success and failure alike. Removal errors are logged and swallowed.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempPath};

#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reserve a uniquely named, empty file whose name ends with `label`.
    pub async fn reserve(&self, label: &str) -> io::Result<StagedArchive> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = Builder::new()
            .prefix("unzipper_")
            .suffix(&format!("_{}", file_label(label)))
            .tempfile_in(&self.dir)?
            .into_temp_path();
        Ok(StagedArchive { path })
    }

    /// Write `data` to a fresh staged file.
    pub async fn stage(&self, data: &[u8], label: &str) -> io::Result<StagedArchive> {
        let staged = self.reserve(label).await?;
        // On error `staged` is dropped here, which removes the partial file.
        tokio::fs::write(staged.path(), data).await?;
        Ok(staged)
    }
}

/// Last path component of `label`, restricted to characters safe in a file name.
fn file_label(label: &str) -> String {
    let base = label.rsplit('/').next().unwrap_or(label);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect();
    if cleaned.is_empty() {
        "archive".to_string()
    } else {
        cleaned
    }
}

/// A staged file, exclusively owned by one extraction step.
#[derive(Debug)]
pub struct StagedArchive {
    path: TempPath,
}

impl StagedArchive {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.path()).await
    }

    /// Remove the staged file now.
    pub fn release(self) {
        let staged_path = self.path.display().to_string();
        if let Err(e) = self.path.close() {
            tracing::debug!(path = %staged_path, error = %e, "Failed to remove staged archive");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn staged_file_is_removed_on_release() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());

        let staged = staging.stage(b"PK\x03\x04", "a/b/bundle.zip").await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_str().unwrap().ends_with("_bundle.zip"));
        assert_eq!(staged.read().await.unwrap(), b"PK\x03\x04");

        staged.release();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn staged_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());

        let path = {
            let staged = staging.stage(b"data", "x.zip").await.unwrap();
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_staging_dir_is_created() {
        let root = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(root.path().join("nested/staging"));

        let staged = staging.stage(b"data", "x.zip").await.unwrap();
        assert!(staged.path().starts_with(staging.dir()));
        assert!(staged.path().exists());

        let path = staged.path().to_path_buf();
        staged.release();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn identical_labels_get_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());

        let first = staging.stage(b"1", "same.zip").await.unwrap();
        let second = staging.stage(b"2", "same.zip").await.unwrap();
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn labels_are_reduced_to_safe_file_names() {
        assert_eq!(file_label("dir/sub/bundle.zip"), "bundle.zip");
        assert_eq!(file_label("we ird*name.zip"), "we_ird_name.zip");
        assert_eq!(file_label(""), "archive");
        assert_eq!(file_label("dir/"), "archive");
    }
}

//! Directory detection for archive entries.
//!
//! Several zip producers neither append a trailing `/` to directory entries nor
//! set the native directory flag. Trusting the flag alone makes those
//! directories show up as zero-byte files, so the Unix mode carried in the high
//! half of the external attributes is checked as well.

/// Unix `S_IFDIR` bit.
pub const UNIX_DIRECTORY_BIT: u32 = 0o040000;

/// What an archive reader can tell about an entry's kind.
///
/// Both probes are best effort: `None` means the signal is unavailable.
pub trait EntryAttributes {
    /// The format's own directory indicator.
    fn directory_flag(&self) -> Option<bool>;

    /// Unix file mode (the high 16 bits of zip external attributes).
    fn unix_mode(&self) -> Option<u32>;
}

/// Attributes captured from an entry header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryAttrs {
    pub directory_flag: Option<bool>,
    pub unix_mode: Option<u32>,
}

impl EntryAttributes for EntryAttrs {
    fn directory_flag(&self) -> Option<bool> {
        self.directory_flag
    }

    fn unix_mode(&self) -> Option<u32> {
        self.unix_mode
    }
}

impl EntryAttrs {
    pub fn from_zip(file: &zip::read::ZipFile<'_>) -> Self {
        Self {
            directory_flag: Some(file.is_dir()),
            unix_mode: file.unix_mode(),
        }
    }
}

/// Classify an entry. Missing signals read as "not a directory"; this never fails.
pub fn is_directory<E: EntryAttributes + ?Sized>(entry: &E) -> bool {
    if entry.directory_flag() == Some(true) {
        return true;
    }
    entry
        .unix_mode()
        .map(|mode| mode & UNIX_DIRECTORY_BIT != 0)
        .unwrap_or(false)
}

//! Entry name validation and normalization.
//!
//! Archive entry names are attacker-controlled. [`is_safe`] must accept a name
//! before anything derived from it reaches storage; [`normalize`] then turns it
//! into the relative key suffix used for the upload.

use std::fmt;

/// Validated, normalized relative path of an archive entry.
///
/// Never starts with a separator, never contains a `..` or `.` segment and
/// never contains an empty segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SanitizedPath(String);

impl SanitizedPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty paths come from names such as `""`, `"/"` or `"./"` and are never uploaded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the path without `extension` when it ends with it, compared
    /// ASCII case-insensitively. `extension` includes the dot.
    pub fn strip_extension(&self, extension: &str) -> Option<&str> {
        let split = self.0.len().checked_sub(extension.len())?;
        let tail = self.0.get(split..)?;
        if tail.eq_ignore_ascii_case(extension) {
            Some(&self.0[..split])
        } else {
            None
        }
    }
}

impl fmt::Display for SanitizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SanitizedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Reject absolute names and names with a parent-directory segment.
///
/// Backslashes count as separators too, since [`normalize`] canonicalizes them
/// to `/` and would otherwise turn `..\evil` into a traversal.
pub fn is_safe(raw_name: &str) -> bool {
    if raw_name.starts_with(is_separator) {
        return false;
    }
    !raw_name.split(is_separator).any(|segment| segment == "..")
}

/// Canonicalize separators, collapse empty and `.` segments, drop any leading `./`.
///
/// A `..` segment pops its parent; callers only normalize names that passed
/// [`is_safe`], so that branch never fires for uploaded entries.
pub fn normalize(raw_name: &str) -> SanitizedPath {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw_name.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    SanitizedPath(segments.join("/"))
}

/// Whether the stored name marks a directory regardless of entry attributes.
pub fn is_directory_marker(raw_name: &str) -> bool {
    raw_name.ends_with(is_separator)
}

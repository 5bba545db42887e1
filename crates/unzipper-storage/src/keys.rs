//! Shared key handling for storage backends and the extraction engine.

/// Join a prefix and a relative path with a single `/`.
///
/// An empty prefix yields the path unchanged and a prefix that already ends in
/// `/` is not doubled, so `join_key("out/job1", "a.txt")` and
/// `join_key("out/job1/", "a.txt")` both give `out/job1/a.txt`.
pub fn join_key(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else if prefix.ends_with('/') {
        format!("{}{}", prefix, path)
    } else {
        format!("{}/{}", prefix, path)
    }
}

/// Reject keys that could escape a storage root.
pub(crate) fn is_valid_key(storage_key: &str) -> bool {
    !storage_key.is_empty()
        && !storage_key.starts_with('/')
        && !storage_key.split('/').any(|segment| segment == "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_handles_separators() {
        assert_eq!(join_key("out/job1", "report.txt"), "out/job1/report.txt");
        assert_eq!(join_key("out/job1/", "report.txt"), "out/job1/report.txt");
        assert_eq!(join_key("", "report.txt"), "report.txt");
        assert_eq!(join_key("out", "a/b/c.txt"), "out/a/b/c.txt");
    }

    #[test]
    fn key_validation() {
        assert!(is_valid_key("extracted/a.txt"));
        assert!(is_valid_key("extracted/..hidden"));
        assert!(!is_valid_key("/etc/passwd"));
        assert!(!is_valid_key("extracted/../../etc"));
        assert!(!is_valid_key(""));
    }
}

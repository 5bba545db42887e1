use unzipper_core::constants::DEFAULT_CONTENT_TYPE;

/// Guess the content type from the path's extension.
pub fn content_type_for(path: &str) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(content_type_for("report.txt"), "text/plain");
        assert_eq!(content_type_for("a/b/photo.PNG"), "image/png");
        assert_eq!(content_type_for("data.json"), "application/json");
    }

    #[test]
    fn unknown_extensions_fall_back_to_octet_stream() {
        assert_eq!(content_type_for("blob.unknownext"), "application/octet-stream");
        assert_eq!(content_type_for("Makefile"), "application/octet-stream");
    }
}

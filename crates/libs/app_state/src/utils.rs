use std::path::Path;

/// Converts a path to a POSIX-style string, replacing backslashes with forward slashes.
#[must_use]
pub fn to_posix_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Lowercases a file extension and strips any leading dots, so `".JPG"` and `"jpg"` compare equal.
#[must_use]
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_extensions() {
        assert_eq!(normalize_extension(".JPG"), "jpg");
        assert_eq!(normalize_extension(" png "), "png");
        assert_eq!(normalize_extension("Mp4"), "mp4");
    }

    #[test]
    fn posix_strings_use_forward_slashes() {
        assert_eq!(
            to_posix_string(Path::new("uploads\\ABCD1234\\x.jpg")),
            "uploads/ABCD1234/x.jpg"
        );
    }
}

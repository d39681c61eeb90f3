use app_state::normalize_extension;
use std::path::Path;

/// Characters an album access code is drawn from.
pub const ACCESS_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const ACCESS_CODE_LENGTH: usize = 8;

/// Generate a URL-safe random ID of a given length.
#[must_use]
pub fn nice_id(length: usize) -> String {
    const URL_SAFE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";
    (0..length)
        .map(|_| {
            let idx = rand::random_range(0..URL_SAFE.len());
            URL_SAFE[idx] as char
        })
        .collect()
}

/// Samples a fresh 8 character access code from `[A-Z0-9]`.
///
/// Uniqueness is not checked here, the `album.access_code` constraint enforces it.
#[must_use]
pub fn generate_access_code() -> String {
    (0..ACCESS_CODE_LENGTH)
        .map(|_| {
            let idx = rand::random_range(0..ACCESS_CODE_ALPHABET.len());
            ACCESS_CODE_ALPHABET[idx] as char
        })
        .collect()
}

#[must_use]
pub fn is_valid_access_code(code: &str) -> bool {
    code.len() == ACCESS_CODE_LENGTH && code.bytes().all(|b| ACCESS_CODE_ALPHABET.contains(&b))
}

/// Lowercase extension of a filename without the dot, or an empty string.
#[must_use]
pub fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(normalize_extension)
        .unwrap_or_default()
}

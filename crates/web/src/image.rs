//! Course cover images.
//!
//! Uploaded images are stored inline on the course row as data URLs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Largest accepted upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Encode an upload as `data:<mime>;base64,...`.
///
/// Returns `None` for empty uploads and non-image content types.
#[must_use]
pub fn data_url(content_type: &str, bytes: &[u8]) -> Option<String> {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    if bytes.is_empty() || !mime.starts_with("image/") {
        return None;
    }
    Some(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        assert_eq!(
            data_url("image/png", b"abc").as_deref(),
            Some("data:image/png;base64,YWJj")
        );
        assert_eq!(
            data_url("image/jpeg; charset=binary", b"abc").as_deref(),
            Some("data:image/jpeg;base64,YWJj")
        );
    }

    #[test]
    fn test_rejects_non_images_and_empty_uploads() {
        assert_eq!(data_url("text/html", b"<p>"), None);
        assert_eq!(data_url("image/png", b""), None);
    }
}

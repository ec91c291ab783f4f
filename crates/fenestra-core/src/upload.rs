//! Upload validation for the ingestion pipeline.
//!
//! Multi-layer checks, all before any side effect:
//! 1. Non-empty, within the size cap
//! 2. Extension allow-list (normalized to lowercase)
//! 3. Declared content type allow-list
//! 4. Magic byte verification when the payload is a recognizable format

use crate::error::{Error, Result};

/// Allowed extensions mapped to their canonical MIME types.
pub const ALLOWED_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    /// Normalized (lowercase, allow-listed) extension for the stored file.
    pub extension: &'static str,
}

/// Normalize a filename's extension against the allow-list.
///
/// Returns `None` when the filename has no extension or an extension outside
/// the allow-list.
pub fn normalized_extension(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    ALLOWED_EXTENSIONS
        .iter()
        .find(|(allowed, _)| *allowed == ext)
        .map(|(allowed, _)| *allowed)
}

fn mime_allowed(mime: &str) -> bool {
    ALLOWED_EXTENSIONS.iter().any(|(_, m)| *m == mime)
}

/// Canonical MIME type for an allow-listed extension.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    ALLOWED_EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Validate an upload before any side effect is performed.
///
/// `declared_mime` is the content type claimed by the client, when present.
/// Magic bytes are checked with `infer`: a payload that decodes as some known
/// non-image format (an executable renamed to `.jpg`) is rejected, while
/// payloads with no recognizable signature are trusted on extension alone.
pub fn validate_upload(
    filename: &str,
    declared_mime: Option<&str>,
    data: &[u8],
    max_bytes: usize,
) -> Result<ValidatedUpload> {
    if data.is_empty() {
        return Err(Error::InvalidInput("Empty upload is not allowed".into()));
    }

    if data.len() > max_bytes {
        return Err(Error::InvalidInput(format!(
            "Upload exceeds maximum size of {} bytes",
            max_bytes
        )));
    }

    let extension = normalized_extension(filename).ok_or_else(|| {
        Error::InvalidInput(format!(
            "File type not allowed: {} (allowed: jpg, jpeg, png, gif, webp)",
            filename
        ))
    })?;

    if let Some(mime) = declared_mime {
        if !mime_allowed(mime) {
            return Err(Error::InvalidInput(format!(
                "Content type not allowed: {}",
                mime
            )));
        }
    }

    if let Some(kind) = infer::get(data) {
        if !mime_allowed(kind.mime_type()) {
            return Err(Error::InvalidInput(format!(
                "File content does not match an allowed image format (detected {})",
                kind.mime_type()
            )));
        }
    }

    Ok(ValidatedUpload { extension })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal valid PNG header followed by padding.
    fn png_bytes() -> Vec<u8> {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&[0u8; 64]);
        data
    }

    #[test]
    fn test_rejects_empty_upload() {
        let err = validate_upload("photo.jpg", None, b"", 1024).unwrap_err();
        assert!(err.to_string().contains("Empty upload"));
    }

    #[test]
    fn test_rejects_oversize_upload() {
        let data = vec![0u8; 2048];
        let err = validate_upload("photo.jpg", None, &data, 1024).unwrap_err();
        assert!(err.to_string().contains("maximum size"));
    }

    #[test]
    fn test_rejects_disallowed_extension() {
        let err = validate_upload("notes.txt", None, b"hello", 1024).unwrap_err();
        assert!(err.to_string().contains("not allowed"));
    }

    #[test]
    fn test_rejects_missing_extension() {
        assert!(validate_upload("photo", None, b"data", 1024).is_err());
    }

    #[test]
    fn test_rejects_disallowed_declared_mime() {
        let err =
            validate_upload("photo.jpg", Some("application/pdf"), b"data", 1024).unwrap_err();
        assert!(err.to_string().contains("Content type"));
    }

    #[test]
    fn test_extension_is_normalized_to_lowercase() {
        let validated = validate_upload("PHOTO.JPEG", Some("image/jpeg"), b"data", 1024).unwrap();
        assert_eq!(validated.extension, "jpeg");
    }

    #[test]
    fn test_accepts_payload_without_magic_bytes() {
        // Garbage bytes carry no recognizable signature; extension wins.
        let validated = validate_upload("photo.jpg", Some("image/jpeg"), b"fakeimagedata", 1024)
            .unwrap();
        assert_eq!(validated.extension, "jpg");
    }

    #[test]
    fn test_accepts_real_png() {
        let data = png_bytes();
        let validated = validate_upload("shot.png", Some("image/png"), &data, 1024).unwrap();
        assert_eq!(validated.extension, "png");
    }

    #[test]
    fn test_rejects_executable_renamed_to_image() {
        // ELF magic bytes under a .jpg name.
        let mut data = vec![0x7F, 0x45, 0x4C, 0x46];
        data.extend_from_slice(&[0u8; 64]);
        let err = validate_upload("payload.jpg", Some("image/jpeg"), &data, 1024).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("jpg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("webp"), Some("image/webp"));
        assert_eq!(mime_for_extension("tiff"), None);
    }

    #[test]
    fn test_normalized_extension_allow_list() {
        assert_eq!(normalized_extension("a.webp"), Some("webp"));
        assert_eq!(normalized_extension("a.b.GIF"), Some("gif"));
        assert_eq!(normalized_extension("archive.tar.gz"), None);
        assert_eq!(normalized_extension("noext"), None);
    }
}

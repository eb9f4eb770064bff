//! Naming and validation rules for uploaded cover and inline images.

use thiserror::Error;
use time::OffsetDateTime;

const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageValidationError {
    #[error("uploaded file is empty")]
    Empty,
    #[error("uploaded file exceeds the {limit_bytes} byte limit")]
    TooLarge { limit_bytes: u64 },
    #[error("uploaded file is not a recognised image")]
    NotAnImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: usize,
    pub height: usize,
}

/// Storage object name for an upload: `{unix_millis}.{ext}`.
pub fn object_name(original_filename: &str, uploaded_at: OffsetDateTime) -> String {
    let millis = uploaded_at.unix_timestamp_nanos() / 1_000_000;
    match file_extension(original_filename) {
        Some(ext) => format!("{millis}.{ext}"),
        None => millis.to_string(),
    }
}

/// Content type sent to storage: the declared one when it is an image type,
/// otherwise a guess from the object name.
pub fn content_type_for(object_name: &str, declared: Option<&str>) -> String {
    match declared.map(str::trim) {
        Some(value) if value.starts_with("image/") => value.to_string(),
        _ => mime_guess::from_path(object_name)
            .first_or_octet_stream()
            .to_string(),
    }
}

/// Check that the payload is a non-empty image within the size limit.
pub fn inspect_image(data: &[u8], limit_bytes: u64) -> Result<ImageDimensions, ImageValidationError> {
    if data.is_empty() {
        return Err(ImageValidationError::Empty);
    }
    if data.len() as u64 > limit_bytes {
        return Err(ImageValidationError::TooLarge { limit_bytes });
    }

    let size = imagesize::blob_size(data).map_err(|_| ImageValidationError::NotAnImage)?;
    Ok(ImageDimensions {
        width: size.width,
        height: size.height,
    })
}

fn file_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.trim().rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|ch| ch.is_ascii_alphanumeric());
    valid.then_some(ext)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn tiny_png() -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0, 0, 0, 0x0D]);
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&3u32.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        bytes
    }

    #[test]
    fn object_name_uses_millis_and_extension() {
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(object_name("Cover.JPG", at), "1700000000000.jpg");
        assert_eq!(object_name("archive.tar.gz", at), "1700000000000.gz");
        assert_eq!(object_name("no-extension", at), "1700000000000");
        assert_eq!(object_name("weird.p?g", at), "1700000000000");
    }

    #[test]
    fn content_type_prefers_declared_image_type() {
        assert_eq!(content_type_for("1.png", Some("image/webp")), "image/webp");
        assert_eq!(
            content_type_for("1.png", Some("application/octet-stream")),
            "image/png"
        );
        assert_eq!(content_type_for("1", None), "application/octet-stream");
    }

    #[test]
    fn inspect_image_accepts_png() {
        let dims = inspect_image(&tiny_png(), 1024).unwrap();
        assert_eq!(dims, ImageDimensions { width: 2, height: 3 });
    }

    #[test]
    fn inspect_image_rejects_bad_payloads() {
        assert_eq!(inspect_image(&[], 1024), Err(ImageValidationError::Empty));
        assert_eq!(
            inspect_image(&tiny_png(), 4),
            Err(ImageValidationError::TooLarge { limit_bytes: 4 })
        );
        assert_eq!(
            inspect_image(b"definitely not an image", 1024),
            Err(ImageValidationError::NotAnImage)
        );
    }
}

use thiserror::Error;

use crate::pipeline::MAX_SOURCE_IMAGE_BYTES;

pub const ALLOWED_MEDIA_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceRejection {
    #[error("Unsupported file type '{0}'. Upload a JPEG or PNG image.")]
    InvalidType(String),
    #[error("Image is too large ({size} bytes; the limit is {limit} bytes).")]
    TooLarge { size: u64, limit: u64 },
}

/// Pure predicate over metadata already known without reading the file body.
/// Accepting a candidate is the caller's cue to replace the current source
/// image and drop any previous result.
pub fn validate_source_candidate(media_type: &str, byte_size: u64) -> Result<(), SourceRejection> {
    let normalized = media_type.trim().to_ascii_lowercase();
    if !ALLOWED_MEDIA_TYPES.contains(&normalized.as_str()) {
        return Err(SourceRejection::InvalidType(media_type.trim().to_string()));
    }
    if byte_size > MAX_SOURCE_IMAGE_BYTES {
        return Err(SourceRejection::TooLarge {
            size: byte_size,
            limit: MAX_SOURCE_IMAGE_BYTES,
        });
    }
    Ok(())
}

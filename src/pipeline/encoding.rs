use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not read the selected image: {0}")]
pub struct EncodingError(pub String);

/// Encodes source bytes into the transport-safe textual payload (standard
/// base64, no data-URL prefix). One attempt per request; the payload is
/// recomputed from the then-current source image every time.
pub fn encode_source_bytes(bytes: &[u8]) -> Result<String, EncodingError> {
    if bytes.is_empty() {
        return Err(EncodingError(String::from("the file has no content")));
    }
    Ok(BASE64_STANDARD.encode(bytes))
}

/// Inverse of [`encode_source_bytes`]; also used to decode upload bodies and
/// result payloads at the HTTP boundary.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, EncodingError> {
    BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|err| EncodingError(format!("payload is not valid base64: {err}")))
}

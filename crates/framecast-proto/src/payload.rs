//! Base64 payload encoding (standard alphabet, padded).

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use bytes::Bytes;

use crate::error::Result;

/// Base64-encode a JPEG image into a response payload.
pub fn encode_payload(jpeg: &[u8]) -> Bytes {
    Bytes::from(BASE64_STANDARD.encode(jpeg))
}

/// Decode a response payload back into JPEG bytes.
pub fn decode_payload(payload: &[u8]) -> Result<Vec<u8>> {
    Ok(BASE64_STANDARD.decode(payload)?)
}

/// Length of the base64 text produced for `raw_len` input bytes.
pub fn encoded_len(raw_len: usize) -> usize {
    raw_len.div_ceil(3) * 4
}

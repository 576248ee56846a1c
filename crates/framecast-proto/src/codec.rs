use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::command::{Command, COMMAND_LEN};
use crate::error::{ProtoError, Result};

/// Response header: ASCII decimal payload length, left-justified, space-padded.
pub const LENGTH_HEADER_SIZE: usize = 16;

const MAX_HEADER_VALUE: u64 = 9_999_999_999_999_999;

/// Largest length that fits in the header (16 decimal digits), clamped to the
/// platform's `usize`.
pub const MAX_ENCODABLE_LENGTH: usize = if MAX_HEADER_VALUE > usize::MAX as u64 {
    usize::MAX
} else {
    MAX_HEADER_VALUE as usize
};

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Render a payload length as the 16-byte response header.
///
/// ```text
/// "48213           "
///  ^ digits first, then ASCII spaces up to 16 bytes
/// ```
pub fn encode_length_header(len: usize) -> Result<[u8; LENGTH_HEADER_SIZE]> {
    if len > MAX_ENCODABLE_LENGTH {
        return Err(ProtoError::PayloadTooLarge {
            size: len,
            max: MAX_ENCODABLE_LENGTH,
        });
    }
    let digits = len.to_string();
    let mut header = [b' '; LENGTH_HEADER_SIZE];
    header[..digits.len()].copy_from_slice(digits.as_bytes());
    Ok(header)
}

/// Parse a 16-byte response header back into a payload length.
///
/// Surrounding ASCII whitespace and NUL padding are ignored; anything else
/// besides decimal digits is rejected.
pub fn decode_length_header(header: &[u8]) -> Result<usize> {
    let invalid = || ProtoError::InvalidLengthHeader(String::from_utf8_lossy(header).into_owned());

    if header.len() != LENGTH_HEADER_SIZE {
        return Err(invalid());
    }
    let text = std::str::from_utf8(header).map_err(|_| invalid())?;
    let digits = text.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    digits.parse::<usize>().map_err(|_| invalid())
}

/// Encode a full `getNewFrame` response (header + payload).
pub fn encode_response(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let header = encode_length_header(payload.len())?;
    dst.reserve(LENGTH_HEADER_SIZE + payload.len());
    dst.put_slice(&header);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a response from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete response yet.
/// On success, consumes the response bytes from the buffer.
pub fn decode_response(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    if src.len() < LENGTH_HEADER_SIZE {
        return Ok(None);
    }

    let payload_len = decode_length_header(&src[..LENGTH_HEADER_SIZE])?;
    if payload_len > max_payload {
        return Err(ProtoError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = LENGTH_HEADER_SIZE + payload_len;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    src.advance(LENGTH_HEADER_SIZE);
    Ok(Some(src.split_to(payload_len).freeze()))
}

/// Encode a command token.
pub fn encode_command(command: &Command, dst: &mut BytesMut) {
    dst.reserve(COMMAND_LEN);
    dst.put_slice(&command.token());
}

/// Decode a command token from a buffer.
///
/// Returns `None` until a full 11-byte token is buffered.
pub fn decode_command(src: &mut BytesMut) -> Option<Command> {
    if src.len() < COMMAND_LEN {
        return None;
    }
    let mut token = [0u8; COMMAND_LEN];
    src.copy_to_slice(&mut token);
    Some(Command::from_token(token))
}

/// Configuration for wire readers and writers.
#[derive(Debug, Clone)]
pub struct WireConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

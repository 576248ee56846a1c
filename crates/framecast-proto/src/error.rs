/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// The 16-byte length header is not a space-padded decimal number.
    #[error("invalid length header {0:?}")]
    InvalidLengthHeader(String),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),

    /// An I/O error occurred while reading or writing.
    #[error("wire I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete message was received.
    #[error("connection closed (incomplete message)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, ProtoError>;

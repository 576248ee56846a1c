//! framecast wire protocol.
//!
//! The protocol is deliberately tiny:
//! - Client → server: an 11-byte ASCII command token (`getNewFrame`,
//!   `closeDriver`, or anything else)
//! - Server → client: a 16-byte ASCII decimal length, left-justified and
//!   space-padded, followed by that many bytes of base64-encoded JPEG
//!
//! [`WireReader`] and [`WireWriter`] handle partial reads and short writes so
//! callers only ever see whole messages.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod command;
pub mod error;
pub mod payload;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::{ClientCodec, ServerCodec};
pub use codec::{
    decode_command, decode_length_header, decode_response, encode_command,
    encode_length_header, encode_response, WireConfig, DEFAULT_MAX_PAYLOAD, LENGTH_HEADER_SIZE,
    MAX_ENCODABLE_LENGTH,
};
pub use command::{Command, CLOSE_DRIVER, COMMAND_LEN, GET_NEW_FRAME};
pub use error::{ProtoError, Result};
pub use payload::{decode_payload, encode_payload, encoded_len};
pub use reader::WireReader;
pub use writer::WireWriter;

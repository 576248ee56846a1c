//! `tokio_util::codec` adapters for the framecast wire protocol.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{
    decode_command, decode_response, encode_command, encode_response, DEFAULT_MAX_PAYLOAD,
};
use crate::command::Command;
use crate::error::{ProtoError, Result};

/// Server side of the protocol: decodes commands, encodes frame payloads.
#[derive(Debug, Clone)]
pub struct ServerCodec {
    max_payload_size: usize,
}

impl ServerCodec {
    pub fn new(max_payload_size: usize) -> Self {
        Self { max_payload_size }
    }
}

impl Default for ServerCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD)
    }
}

impl Decoder for ServerCodec {
    type Item = Command;
    type Error = ProtoError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        Ok(decode_command(src))
    }
}

impl Encoder<Bytes> for ServerCodec {
    type Error = ProtoError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        if item.len() > self.max_payload_size {
            return Err(ProtoError::PayloadTooLarge {
                size: item.len(),
                max: self.max_payload_size,
            });
        }
        encode_response(&item, dst)
    }
}

/// Client side of the protocol: encodes commands, decodes frame payloads.
#[derive(Debug, Clone)]
pub struct ClientCodec {
    max_payload_size: usize,
}

impl ClientCodec {
    pub fn new(max_payload_size: usize) -> Self {
        Self { max_payload_size }
    }
}

impl Default for ClientCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD)
    }
}

impl Encoder<Command> for ClientCodec {
    type Error = ProtoError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<()> {
        encode_command(&item, dst);
        Ok(())
    }
}

impl Decoder for ClientCodec {
    type Item = Bytes;
    type Error = ProtoError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        decode_response(src, self.max_payload_size)
    }
}

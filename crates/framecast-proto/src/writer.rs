use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use framecast_transport::FrameStream;
use tracing::debug;

use crate::codec::{encode_command, encode_response, WireConfig};
use crate::command::Command;
use crate::error::{ProtoError, Result};
use crate::reader::transport_to_proto_error;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete wire messages to any `Write` stream.
///
/// Short writes are looped until the whole message is out, so a response is
/// never left half-sent on success. The stream is expected to be blocking:
/// `WouldBlock` or `TimedOut` means the write timeout expired and is returned
/// as [`ProtoError::Io`].
pub struct WireWriter<T> {
    inner: T,
    buf: BytesMut,
    config: WireConfig,
}

impl<T: Write> WireWriter<T> {
    /// Create a new wire writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, WireConfig::default())
    }

    /// Create a new wire writer with explicit configuration.
    pub fn with_config(inner: T, config: WireConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Send a command token (client side).
    pub fn send_command(&mut self, command: &Command) -> Result<()> {
        self.buf.clear();
        encode_command(command, &mut self.buf);
        self.write_buffered()
    }

    /// Send the 16-byte length header followed by the payload (server side).
    pub fn send_payload(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            debug!(
                size = payload.len(),
                max = self.config.max_payload_size,
                "payload exceeds limit"
            );
            return Err(ProtoError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        encode_response(payload, &mut self.buf)?;
        self.write_buffered()
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => {
                    debug!(written = offset, total = self.buf.len(), "peer stopped accepting data");
                    return Err(ProtoError::ConnectionClosed);
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    debug!(written = offset, total = self.buf.len(), error = %err, "write failed");
                    return Err(ProtoError::Io(err));
                }
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProtoError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current wire writer configuration.
    pub fn config(&self) -> &WireConfig {
        &self.config
    }
}

impl WireWriter<FrameStream> {
    /// Create a wire writer for a TCP stream and apply the write timeout from config.
    pub fn with_config_stream(inner: FrameStream, config: WireConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_proto_error)?;
        Ok(Self::with_config(inner, config))
    }
}

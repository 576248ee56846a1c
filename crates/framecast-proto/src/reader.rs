use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use framecast_transport::FrameStream;
use tracing::debug;

use crate::codec::{decode_command, decode_response, WireConfig};
use crate::command::Command;
use crate::error::{ProtoError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Reads complete wire messages from any `Read` stream.
///
/// Handles partial reads internally. Callers always get a whole command
/// token or a whole response payload.
pub struct WireReader<T> {
    inner: T,
    buf: BytesMut,
    config: WireConfig,
}

impl<T: Read> WireReader<T> {
    /// Create a new wire reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, WireConfig::default())
    }

    /// Create a new wire reader with explicit configuration.
    pub fn with_config(inner: T, config: WireConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next 11-byte command token (blocking).
    ///
    /// Returns `Err(ProtoError::ConnectionClosed)` when EOF is reached.
    pub fn read_command(&mut self) -> Result<Command> {
        loop {
            if let Some(command) = decode_command(&mut self.buf) {
                return Ok(command);
            }
            self.fill()?;
        }
    }

    /// Read the next length-prefixed response payload (blocking).
    ///
    /// The returned bytes are the base64 text exactly as sent.
    pub fn read_payload(&mut self) -> Result<Bytes> {
        loop {
            match decode_response(&mut self.buf, self.config.max_payload_size) {
                Ok(Some(payload)) => return Ok(payload),
                Ok(None) => {}
                Err(err) => {
                    debug!(error = %err, "rejected response header");
                    return Err(err);
                }
            }
            self.fill()?;
        }
    }

    fn fill(&mut self) -> Result<()> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProtoError::Io(err)),
            };

            if read == 0 {
                debug!(buffered = self.buf.len(), "peer closed connection");
                return Err(ProtoError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
            return Ok(());
        }
    }

    /// Number of bytes received but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current wire reader configuration.
    pub fn config(&self) -> &WireConfig {
        &self.config
    }
}

impl WireReader<FrameStream> {
    /// Create a wire reader for a TCP stream and apply the read timeout from config.
    pub fn with_config_stream(inner: FrameStream, config: WireConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_proto_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_proto_error(err: framecast_transport::TransportError) -> ProtoError {
    match err {
        framecast_transport::TransportError::Io(io)
        | framecast_transport::TransportError::Accept(io) => ProtoError::Io(io),
        framecast_transport::TransportError::Bind { source, .. }
        | framecast_transport::TransportError::Connect { source, .. } => ProtoError::Io(source),
        other => ProtoError::Io(std::io::Error::other(other.to_string())),
    }
}

use std::net::{Shutdown, SocketAddr};
use std::time::{Duration, Instant};

use bytes::Bytes;
use framecast_proto::{decode_payload, Command, WireReader, WireWriter, COMMAND_LEN};
use framecast_transport::{FrameStream, TcpTransport};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Result;

/// One frame fetched from a server.
#[derive(Debug, Clone)]
pub struct ReceivedFrame {
    /// Length of the base64 payload as announced in the header.
    pub payload_len: usize,
    /// Decoded JPEG bytes.
    pub jpeg: Vec<u8>,
    /// Time from sending `getNewFrame` to having the full payload.
    pub elapsed: Duration,
}

/// Blocking client for a frame server.
pub struct FrameClient {
    reader: WireReader<FrameStream>,
    writer: WireWriter<FrameStream>,
    peer_addr: Option<SocketAddr>,
}

impl FrameClient {
    /// Connect with default configuration.
    pub fn connect(addr: &str) -> Result<Self> {
        Self::connect_with_config(addr, &ClientConfig::default())
    }

    /// Connect with explicit configuration.
    pub fn connect_with_config(addr: &str, config: &ClientConfig) -> Result<Self> {
        let stream = match config.connect_timeout {
            Some(timeout) => TcpTransport::connect_timeout(addr, timeout)?,
            None => TcpTransport::connect(addr)?,
        };
        stream.set_nodelay(true)?;
        let peer_addr = stream.peer_addr();
        let reader_stream = stream.try_clone()?;

        let wire = config.wire_config();
        let reader = WireReader::with_config_stream(reader_stream, wire.clone())?;
        let writer = WireWriter::with_config_stream(stream, wire)?;

        debug!(peer = ?peer_addr, "connected to frame server");
        Ok(Self {
            reader,
            writer,
            peer_addr,
        })
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Send `getNewFrame` and return the raw base64 payload.
    pub fn request_payload(&mut self) -> Result<Bytes> {
        self.writer.send_command(&Command::GetNewFrame)?;
        Ok(self.reader.read_payload()?)
    }

    /// Send `getNewFrame` and decode the response into JPEG bytes.
    pub fn request_frame(&mut self) -> Result<ReceivedFrame> {
        let started = Instant::now();
        let payload = self.request_payload()?;
        let elapsed = started.elapsed();
        let jpeg = decode_payload(&payload)?;

        debug!(
            payload_bytes = payload.len(),
            jpeg_bytes = jpeg.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "frame received"
        );
        Ok(ReceivedFrame {
            payload_len: payload.len(),
            jpeg,
            elapsed,
        })
    }

    /// Send an arbitrary 11-byte token. The server answers only `getNewFrame`.
    pub fn send_token(&mut self, token: [u8; COMMAND_LEN]) -> Result<()> {
        self.writer.send_command(&Command::from_token(token))?;
        Ok(())
    }

    /// Ask the server to shut down, then release the connection.
    pub fn close_driver(mut self) -> Result<()> {
        self.writer.send_command(&Command::CloseDriver)?;
        self.disconnect();
        Ok(())
    }

    /// Half-close the write side and drop the connection.
    ///
    /// The server sees end-of-stream and goes back to accepting.
    pub fn disconnect(self) {
        if let Err(err) = self.writer.get_ref().shutdown(Shutdown::Write) {
            debug!(peer = ?self.peer_addr, error = %err, "shutdown failed");
        }
    }
}

impl std::fmt::Debug for FrameClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameClient")
            .field("peer_addr", &self.peer_addr)
            .finish()
    }
}

use std::net::{Shutdown, SocketAddr};

use framecast_proto::{Command, WireConfig, WireReader, WireWriter};
use framecast_transport::FrameStream;
use tracing::{debug, warn};

use crate::error::Result;

/// The single accepted client connection.
pub struct Connection {
    id: String,
    peer_addr: Option<SocketAddr>,
    reader: WireReader<FrameStream>,
    writer: WireWriter<FrameStream>,
}

impl Connection {
    pub(crate) fn open(stream: FrameStream, id: String, config: WireConfig) -> Result<Self> {
        let peer_addr = stream.peer_addr();
        let reader_stream = stream.try_clone()?;
        let reader = WireReader::with_config_stream(reader_stream, config.clone())?;
        let writer = WireWriter::with_config_stream(stream, config)?;
        Ok(Self {
            id,
            peer_addr,
            reader,
            writer,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    pub(crate) fn read_command(&mut self) -> framecast_proto::Result<Command> {
        self.reader.read_command()
    }

    pub(crate) fn send_payload(&mut self, payload: &[u8]) -> framecast_proto::Result<()> {
        self.writer.send_payload(payload)
    }

    /// Shut the socket down in both directions and release it.
    pub(crate) fn close(self) {
        match self.writer.get_ref().shutdown(Shutdown::Both) {
            Ok(()) => debug!(id = %self.id, peer = ?self.peer_addr, "connection closed"),
            Err(err) => {
                warn!(id = %self.id, peer = ?self.peer_addr, error = %err, "connection shutdown failed")
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer_addr", &self.peer_addr)
            .finish()
    }
}

/// Lifecycle of the server's client slot.
///
/// `Idle` before the first accept and between abandoning one client and
/// accepting the next; `Closed` once `closeDriver` has been handled.
#[derive(Debug, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connected(Connection),
    Closed,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    /// Take the active connection out, leaving `Idle`.
    pub(crate) fn take_connection(&mut self) -> Option<Connection> {
        match std::mem::take(self) {
            Self::Connected(conn) => Some(conn),
            other => {
                *self = other;
                None
            }
        }
    }
}

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use socket2::SockRef;
use tracing::debug;

use crate::error::Result;

/// A connected TCP stream implementing `Read` and `Write`.
///
/// This is the fundamental I/O type returned by [`crate::TcpTransport::accept`]
/// and [`crate::TcpTransport::connect`]. The peer address is captured once at
/// construction so it stays available for logging after the socket is shut down.
pub struct FrameStream {
    inner: TcpStream,
    peer_addr: Option<SocketAddr>,
}

impl Read for FrameStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for FrameStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl FrameStream {
    /// Wrap an already connected TCP stream.
    pub fn from_tcp(stream: TcpStream) -> Self {
        let peer_addr = stream.peer_addr().ok();
        Self {
            inner: stream,
            peer_addr,
        }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Disable Nagle's algorithm so short command tokens go out immediately.
    pub fn set_nodelay(&self, nodelay: bool) -> Result<()> {
        self.inner.set_nodelay(nodelay).map_err(Into::into)
    }

    /// Set `SO_SNDBUF`. The kernel may round the value; kernel auto-tuning of
    /// the send buffer stops once it is set.
    pub fn set_send_buffer_size(&self, size: usize) -> Result<()> {
        SockRef::from(&self.inner)
            .set_send_buffer_size(size)
            .map_err(Into::into)
    }

    /// Current `SO_SNDBUF` as reported by the kernel.
    pub fn send_buffer_size(&self) -> Result<usize> {
        SockRef::from(&self.inner)
            .send_buffer_size()
            .map_err(Into::into)
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self {
            inner: cloned,
            peer_addr: self.peer_addr,
        })
    }

    /// Address of the remote end, if it was known when the stream was created.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Local address of this end of the stream.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.inner.local_addr().map_err(Into::into)
    }

    /// Shut down one or both halves of the connection.
    ///
    /// A peer that already went away is not an error here: the stream is being
    /// abandoned either way.
    pub fn shutdown(&self, how: Shutdown) -> Result<()> {
        match self.inner.shutdown(how) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => {
                debug!(peer = ?self.peer_addr, "stream already disconnected");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl std::fmt::Debug for FrameStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStream")
            .field("type", &"tcp")
            .field("peer", &self.peer_addr)
            .finish()
    }
}
